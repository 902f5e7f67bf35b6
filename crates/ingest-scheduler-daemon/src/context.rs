use ingest_core::config::IngestConfig;
use ingest_sessions::SessionStore;
use sqlx::PgPool;

/// Shared state handed to every job handler (§4.13).
pub struct DaemonContext {
    pub config: IngestConfig,
    pub pool: PgPool,
    pub sessions: SessionStore,
    /// Propagated to spawned backfill jobs so they load the same config file.
    pub config_path: Option<String>,
}
