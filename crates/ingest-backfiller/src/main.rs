use std::ops::ControlFlow;
use std::time::Duration;

use anyhow::Context;
use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;
use ingest_core::types::{BusEventKind, RawMessageBody, RawMessagePayload};
use ingest_telegram::{IdentityClient, IncomingMessage};
use rand::Rng;
use tracing_subscriber::EnvFilter;

/// One-shot job that walks a single (identity, chat) history and publishes
/// it onto the historical bus lane (§4.6). No direct database writes — the
/// ingestor is the only component allowed to persist.
#[derive(Parser)]
struct Cli {
    #[arg(long, env = "INGEST_IDENTITY_ID")]
    identity_id: String,
    #[arg(long)]
    chat_id: i64,
    /// Cold-start horizon in days, overriding the configured default.
    #[arg(long)]
    days: Option<u32>,
    #[arg(long, env = "INGEST_CONFIG")]
    config: Option<String>,
}

const MAX_RETRIES: u32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ingest_backfiller=info,lapin=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ingest_core::config::IngestConfig::load(cli.config.as_deref())
        .context("loading config")?;

    let conn = rusqlite::Connection::open(&config.session.db_path).context("opening session db")?;
    ingest_sessions::db::init_db(&conn).context("initializing session db")?;
    let session_store =
        ingest_sessions::SessionStore::new(conn, config.session.crypto_key.as_deref())?;

    let credential = session_store
        .get(&cli.identity_id)?
        .ok_or_else(|| anyhow::anyhow!("no credential for identity {}", cli.identity_id))?;

    let pool = ingest_store::connect(&config.database.url)
        .await
        .context("connecting to relational store")?;
    let watermark = ingest_store::persister::watermark(&pool, cli.chat_id)
        .await
        .context("reading watermark")?;

    let client = IdentityClient::connect(
        &cli.identity_id,
        config.telegram.api_id,
        &config.telegram.api_hash,
        Some(credential),
    )
    .await
    .context("connecting to chat platform")?;

    let bus = ingest_bus::connect_once(&config.bus.amqp_uri())
        .await
        .context("connecting to bus")?;

    let days = cli.days.unwrap_or(config.realtime.scheduled_history_days);
    let horizon = Utc::now() - ChronoDuration::days(days as i64);

    let messages = fetch_with_retry(&client, cli.chat_id, watermark, horizon).await?;

    let mut published = 0u64;
    let mut failed = 0u64;
    for msg in &messages {
        let payload = RawMessagePayload {
            event: BusEventKind::HistoricalMessage,
            chat_id: msg.chat_id,
            message_id: msg.message_id as i64,
            message: RawMessageBody {
                message: msg.text.clone(),
                date: msg.date,
                sender_id: msg.sender_id,
            },
            sender_username: msg.sender_username.clone(),
            chat_username: msg.chat_username.clone(),
        };
        match serde_json::to_vec(&payload) {
            Ok(bytes) => match bus.publish(ingest_bus::Lane::Historical, &bytes).await {
                Ok(()) => published += 1,
                Err(e) => {
                    tracing::warn!(chat_id = cli.chat_id, error = %e, "publish failed");
                    failed += 1;
                }
            },
            Err(e) => {
                tracing::warn!(chat_id = cli.chat_id, error = %e, "payload serialization failed");
                failed += 1;
            }
        }
    }

    tracing::info!(
        identity_id = %cli.identity_id,
        chat_id = cli.chat_id,
        yielded = messages.len(),
        published,
        failed,
        "backfill job complete"
    );

    if failed > 0 && published == 0 {
        anyhow::bail!("backfill job published nothing ({failed} failures)");
    }
    Ok(())
}

/// Walks history newest-to-oldest, stopping at the watermark (incremental
/// mode) or the days-back horizon (cold-start mode). Retries the whole walk
/// with jittered backoff on transient platform errors (§4.6); each attempt
/// restarts from the newest message, so nothing has been published yet and
/// collecting fresh each time is safe.
async fn fetch_with_retry(
    client: &IdentityClient,
    chat_id: i64,
    watermark: Option<i64>,
    horizon: chrono::DateTime<Utc>,
) -> anyhow::Result<Vec<IncomingMessage>> {
    let mut attempt = 0u32;
    loop {
        let mut collected = Vec::new();
        let outcome = client
            .backfill_history(chat_id, |msg| {
                let stop = match watermark {
                    Some(wm) => (msg.message_id as i64) <= wm,
                    None => msg.date < horizon,
                };
                if stop {
                    ControlFlow::Break(())
                } else {
                    collected.push(msg);
                    ControlFlow::Continue(())
                }
            })
            .await;

        match outcome {
            Ok(_) => return Ok(collected),
            Err(e) if attempt + 1 < MAX_RETRIES => {
                attempt += 1;
                let backoff_secs = 2u64.saturating_pow(attempt).min(60);
                let jitter_ms = rand::thread_rng().gen_range(0..1000);
                tracing::warn!(chat_id, error = %e, attempt, "backfill attempt failed, retrying");
                tokio::time::sleep(Duration::from_secs(backoff_secs) + Duration::from_millis(jitter_ms)).await;
            }
            Err(e) => {
                anyhow::bail!("backfill exhausted retries for chat {chat_id}: {e}");
            }
        }
    }
}
