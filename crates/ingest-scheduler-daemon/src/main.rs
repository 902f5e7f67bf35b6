mod context;
mod enqueue;
mod jobs;

use anyhow::Context as _;
use clap::Parser;
use ingest_scheduler::{Schedule, SchedulerEngine};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use context::DaemonContext;

/// C13: the periodic-jobs process. Drives reassignment (C3/C4/C2),
/// new-chat bootstrapping, and full backfill on independent schedules,
/// enqueuing C6 jobs as each fires.
#[derive(Parser)]
struct Cli {
    #[arg(long, env = "INGEST_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ingest_scheduler_daemon=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ingest_core::config::IngestConfig::load(cli.config.as_deref())
        .context("loading config")?;

    let pool = ingest_store::connect(&config.database.url)
        .await
        .context("connecting to relational store")?;

    let session_conn =
        rusqlite::Connection::open(&config.session.db_path).context("opening session db")?;
    ingest_sessions::db::init_db(&session_conn).context("initializing session db")?;
    let sessions = ingest_sessions::SessionStore::new(session_conn, config.session.crypto_key.as_deref())?;

    let scheduler_conn =
        rusqlite::Connection::open(&config.scheduler.db_path).context("opening scheduler db")?;

    let ctx = DaemonContext {
        config: config.clone(),
        pool,
        sessions,
        config_path: cli.config.clone(),
    };

    let (fired_tx, mut fired_rx) = mpsc::channel(64);
    let engine =
        SchedulerEngine::new(scheduler_conn, Some(fired_tx)).context("initializing scheduler engine")?;
    register_jobs(&engine).context("registering jobs")?;

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine.run(shutdown_rx));

    tracing::info!("scheduler daemon started");

    while let Some(job) = fired_rx.recv().await {
        jobs::dispatch(job, &ctx).await;
    }

    let _ = engine_task.await;
    Ok(())
}

/// Registers the three jobs idempotently so restarting the daemon does not
/// pile up duplicate pending rows in the persisted job table.
fn register_jobs(engine: &SchedulerEngine) -> anyhow::Result<()> {
    let existing = engine.list_jobs()?;
    let has = |name: &str| existing.iter().any(|j| j.name == name);

    if !has(jobs::REASSIGN) {
        engine.add_job(jobs::REASSIGN, Schedule::Interval { every_secs: 3600 }, "{}")?;
    }
    if !has(jobs::BOOTSTRAP_NEW_CHATS) {
        engine.add_job(
            jobs::BOOTSTRAP_NEW_CHATS,
            Schedule::Interval { every_secs: 900 },
            "{}",
        )?;
    }
    if !has(jobs::FULL_BACKFILL) {
        engine.add_job(jobs::FULL_BACKFILL, Schedule::Daily { hour: 3, minute: 0 }, "{}")?;
    }
    Ok(())
}
