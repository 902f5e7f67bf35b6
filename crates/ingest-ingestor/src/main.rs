mod classify;
mod context;
mod notify;
mod pipeline;
mod routing;
mod stats;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use ingest_bus::Lane;
use tracing_subscriber::EnvFilter;

use context::PipelineContext;

/// The ingestor (C9): consumes both bus lanes, batches, classifies, persists
/// and routes. Embeds the persister (C10) directly rather than running it
/// as a separate process.
#[derive(Parser)]
struct Cli {
    #[arg(long, env = "INGEST_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ingest_ingestor=info,lapin=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ingest_core::config::IngestConfig::load(cli.config.as_deref())
        .context("loading config")?;

    let amqp_uri = config.bus.amqp_uri();
    let ctx = Arc::new(PipelineContext::build(config).await.context("building pipeline context")?);
    let bus = Arc::new(ingest_bus::connect_with_backoff(&amqp_uri).await);

    let realtime = tokio::spawn(pipeline::run_consumer_loop(
        Lane::Realtime,
        bus.clone(),
        ctx.clone(),
    ));
    let historical = tokio::spawn(pipeline::run_consumer_loop(
        Lane::Historical,
        bus.clone(),
        ctx.clone(),
    ));
    let stats_reporter = tokio::spawn(report_stats(ctx.clone()));

    tracing::info!("ingestor started, consuming realtime_raw and historical_raw");

    let _ = tokio::join!(realtime, historical, stats_reporter);
    Ok(())
}

async fn report_stats(ctx: Arc<PipelineContext>) {
    let mut tick = tokio::time::interval(Duration::from_secs(60));
    loop {
        tick.tick().await;
        ctx.stats.emit_and_reset();
    }
}
