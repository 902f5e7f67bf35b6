mod stats;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ingest_core::types::{BusEventKind, RawMessageBody, RawMessagePayload};
use ingest_telegram::{IdentityClient, ListenerEvent, TelegramError};
use tracing_subscriber::EnvFilter;

use stats::ListenerStats;

/// One process per identity, forwarding new messages onto the realtime bus
/// lane while the current assignment allows it (§4.5).
#[derive(Parser)]
struct Cli {
    #[arg(long, env = "INGEST_IDENTITY_ID")]
    identity_id: String,
    #[arg(long, env = "INGEST_CONFIG")]
    config: Option<String>,
}

const AUTH_LOSS_SLEEP: Duration = Duration::from_secs(3600);
const RECONNECT_BACKOFF: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ingest_listener=info,lapin=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ingest_core::config::IngestConfig::load(cli.config.as_deref())
        .context("loading config")?;
    let identity_id = cli.identity_id;

    let conn = rusqlite::Connection::open(&config.session.db_path).context("opening session db")?;
    ingest_sessions::db::init_db(&conn).context("initializing session db")?;
    let session_store =
        ingest_sessions::SessionStore::new(conn, config.session.crypto_key.as_deref())?;

    let credential = match session_store.get(&identity_id)? {
        Some(c) => c,
        None => {
            tracing::error!(identity_id = %identity_id, "no credential for this identity, exiting for restart");
            std::process::exit(1);
        }
    };

    let pool = ingest_store::connect(&config.database.url)
        .await
        .context("connecting to relational store")?;

    let client = connect_with_retry(
        &identity_id,
        config.telegram.api_id,
        &config.telegram.api_hash,
        credential,
    )
    .await;

    let bus = ingest_bus::connect_with_backoff(&config.bus.amqp_uri()).await;

    let stats = Arc::new(ListenerStats::default());
    let mut allowed_ids = ingest_store::assignments::get_allowed(&pool, &identity_id)
        .await
        .unwrap_or_default();

    let mut stats_tick = tokio::time::interval(Duration::from_secs(60));

    tracing::info!(identity_id = %identity_id, allowed_size = allowed_ids.len(), "listener started");

    loop {
        tokio::select! {
            event = client.next_event() => {
                handle_event(event, &identity_id, &bus, &stats, &allowed_ids).await;
            }
            _ = ingest_store::assignments::wait_for_update(&pool) => {
                match ingest_store::assignments::get_allowed(&pool, &identity_id).await {
                    Ok(ids) => allowed_ids = ids,
                    Err(e) => tracing::warn!(identity_id = %identity_id, error = %e, "failed to refresh allowed chat-ids"),
                }
            }
            _ = stats_tick.tick() => {
                stats.emit_and_reset(&identity_id, allowed_ids.len());
            }
        }
    }
}

/// Connects, retrying transient failures with a fixed backoff; an
/// authorization loss sleeps long enough for a supervisor restart cycle
/// rather than spinning (§4.5 failure semantics).
async fn connect_with_retry(
    identity_id: &str,
    api_id: i32,
    api_hash: &str,
    credential: ingest_sessions::Credential,
) -> IdentityClient {
    loop {
        match IdentityClient::connect(identity_id, api_id, api_hash, Some(credential.clone())).await {
            Ok(client) => return client,
            Err(TelegramError::NotAuthorized) => {
                tracing::error!(identity_id, "credential not authorized, sleeping before exit");
                tokio::time::sleep(AUTH_LOSS_SLEEP).await;
                std::process::exit(1);
            }
            Err(e) => {
                tracing::warn!(identity_id, error = %e, "connect failed, retrying");
                tokio::time::sleep(RECONNECT_BACKOFF).await;
            }
        }
    }
}

async fn handle_event(
    event: ingest_telegram::Result<ListenerEvent>,
    identity_id: &str,
    bus: &ingest_bus::Bus,
    stats: &ListenerStats,
    allowed_ids: &[i64],
) {
    match event {
        Ok(ListenerEvent::NewMessage(msg)) => {
            stats.mark_received();
            if !allowed_ids.is_empty() && !allowed_ids.contains(&msg.chat_id) {
                return;
            }

            let payload = RawMessagePayload {
                event: BusEventKind::NewMessage,
                chat_id: msg.chat_id,
                message_id: msg.message_id as i64,
                message: RawMessageBody {
                    message: msg.text,
                    date: msg.date,
                    sender_id: msg.sender_id,
                },
                sender_username: msg.sender_username,
                chat_username: msg.chat_username,
            };

            match serde_json::to_vec(&payload) {
                Ok(bytes) => match bus.publish(ingest_bus::Lane::Realtime, &bytes).await {
                    Ok(()) => stats.mark_published(),
                    Err(e) => {
                        tracing::warn!(identity_id, error = %e, "publish failed, dropping event");
                        stats.mark_failed();
                    }
                },
                Err(e) => {
                    tracing::warn!(identity_id, error = %e, "payload serialization failed");
                    stats.mark_failed();
                }
            }
        }
        Ok(ListenerEvent::Other) => {}
        Err(TelegramError::NotAuthorized) => {
            tracing::error!(identity_id, "lost authorization, sleeping before exit");
            tokio::time::sleep(AUTH_LOSS_SLEEP).await;
            std::process::exit(1);
        }
        Err(e) => {
            tracing::warn!(identity_id, error = %e, "listener event error, backing off");
            tokio::time::sleep(RECONNECT_BACKOFF).await;
        }
    }
}
