use std::collections::HashMap;

use ingest_core::config::IngestConfig;
use ingest_core::types::Location;
use ingest_llm::LlmClient;
use ingest_prefilter::Prefilter;
use sqlx::PgPool;
use teloxide::Bot;

use crate::routing::RoutingTable;
use crate::stats::IngestorStats;

const ROUTING_RELOAD_INTERVAL_SECS: u64 = 30;
const PREFILTER_RELOAD_INTERVAL_SECS: u64 = 30;

/// Shared state for both consumer loops (§4.9): one store pool, one LLM
/// client, one prefilter, one routing table, one notifier bot, one stats
/// object.
pub struct PipelineContext {
    pub config: IngestConfig,
    pub pool: PgPool,
    pub llm: LlmClient,
    pub prefilter: Prefilter,
    pub routing: RoutingTable,
    pub chat_locations: HashMap<i64, Vec<Location>>,
    pub notifier_bot: Option<Bot>,
    pub stats: IngestorStats,
}

impl PipelineContext {
    pub async fn build(config: IngestConfig) -> anyhow::Result<Self> {
        let pool = ingest_store::connect(&config.database.url).await?;

        let llm = LlmClient::new(
            config.llm.openrouter_api_key.clone(),
            config.llm.base_url.clone(),
            config.llm.model_name.clone(),
            config.batch.llm_batch_size,
        );

        let prefilter = Prefilter::new(
            Some(std::path::PathBuf::from(&config.paths.prefilter)),
            PREFILTER_RELOAD_INTERVAL_SECS,
        );

        let routing = RoutingTable::load(
            std::path::PathBuf::from(&config.paths.routing),
            ROUTING_RELOAD_INTERVAL_SECS,
        );

        let chat_locations = match ingest_core::realtime_config::load_realtime_config(
            std::path::Path::new(&config.paths.realtime),
        ) {
            Ok(realtime) => realtime
                .chats
                .into_iter()
                .map(|c| (c.chat_id, c.locations))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "realtime config unreadable, routing will see no source locations");
                HashMap::new()
            }
        };

        let notifier_bot = if config.notifier.signals_channel_bot_token.is_empty() {
            None
        } else {
            Some(Bot::new(config.notifier.signals_channel_bot_token.clone()))
        };

        Ok(Self {
            config,
            pool,
            llm,
            prefilter,
            routing,
            chat_locations,
            notifier_bot,
            stats: IngestorStats::default(),
        })
    }
}
