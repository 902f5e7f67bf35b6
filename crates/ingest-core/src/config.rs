use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Batch-size / timing knobs for the ingestor's read loop (§4.9).
pub const READ_BATCH_SIZE: usize = 70;
pub const READ_BATCH_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub telegram: TelegramCredentials,
    pub realtime: RealtimeRuntimeConfig,
    pub weight: WeightConfig,
    pub database: DatabaseConfig,
    pub bus: BusConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    pub llm: LlmConfig,
    pub batch: BatchConfig,
    pub notifier: NotifierConfig,
    pub paths: ConfigPaths,
}

/// MTProto application credentials, shared by every listener/backfiller identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramCredentials {
    pub api_id: i32,
    pub api_hash: String,
}

/// Cadence and capacity knobs for the reassignment job (C4) and eligibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeRuntimeConfig {
    #[serde(default = "default_assignment_tick_seconds")]
    pub assignment_tick_seconds: u64,
    #[serde(default = "default_account_capacity")]
    pub account_capacity_default: u32,
    #[serde(default = "default_scheduled_history_days")]
    pub scheduled_history_days: u32,
    #[serde(default)]
    pub backfill_via_rabbit: bool,
}

/// Coefficients for the recency-weighted chat-load formula (§weights).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default = "default_weight_alpha")]
    pub alpha: f64,
    #[serde(default = "default_weight_min")]
    pub min: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            alpha: default_weight_alpha(),
            min: default_weight_min(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string backing `ingest-store` (messages, assignments).
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    #[serde(default = "default_rabbitmq_host")]
    pub host: String,
    #[serde(default = "default_rabbitmq_port")]
    pub port: u16,
    #[serde(default = "default_rabbitmq_user")]
    pub user: String,
    pub password: String,
}

impl BusConfig {
    /// AMQP URI built from the discrete `RABBITMQ_*` fields, matching the
    /// historic environment shape rather than a single `AMQP_URL`.
    pub fn amqp_uri(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/%2f",
            self.user, self.password, self.host, self.port
        )
    }
}

/// Local per-identity session store (`ingest-sessions`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_db_path")]
    pub db_path: String,
    /// Base64 or raw 32-byte key used for AES-256-GCM session blob encryption.
    /// Absence is tolerated at load time but fatal the first time a credential
    /// is actually touched (see `ingest-sessions::crypto`).
    pub crypto_key: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            db_path: default_session_db_path(),
            crypto_key: None,
        }
    }
}

/// Local job store for the scheduler daemon (`ingest-scheduler`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_scheduler_db_path")]
    pub db_path: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            db_path: default_scheduler_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub openrouter_api_key: String,
    #[serde(default = "default_llm_model_name")]
    pub model_name: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_read_batch_size")]
    pub read_batch_size: usize,
    #[serde(default = "default_read_batch_timeout_secs")]
    pub read_batch_timeout_secs: u64,
    #[serde(default = "default_llm_batch_size")]
    pub llm_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            read_batch_size: default_read_batch_size(),
            read_batch_timeout_secs: default_read_batch_timeout_secs(),
            llm_batch_size: default_llm_batch_size(),
        }
    }
}

/// The notifier's (C12) outbound bot — distinct from the MTProto identities
/// used for listening/backfilling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub signals_channel_bot_token: String,
}

/// Filesystem locations for the three hot-reloadable JSON config documents
/// (realtime accounts/chats, routing table, prefilter rules).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPaths {
    #[serde(default = "default_realtime_config_path")]
    pub realtime: String,
    #[serde(default = "default_routing_config_path")]
    pub routing: String,
    #[serde(default = "default_prefilter_config_path")]
    pub prefilter: String,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            realtime: default_realtime_config_path(),
            routing: default_routing_config_path(),
            prefilter: default_prefilter_config_path(),
        }
    }
}

fn default_assignment_tick_seconds() -> u64 {
    30
}
fn default_account_capacity() -> u32 {
    50
}
fn default_scheduled_history_days() -> u32 {
    3
}
fn default_weight_alpha() -> f64 {
    0.7
}
fn default_weight_min() -> f64 {
    0.05
}
fn default_rabbitmq_host() -> String {
    "localhost".to_string()
}
fn default_rabbitmq_port() -> u16 {
    5672
}
fn default_rabbitmq_user() -> String {
    "guest".to_string()
}
fn default_session_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.ingest/sessions.db", home)
}
fn default_scheduler_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.ingest/scheduler.db", home)
}
fn default_llm_model_name() -> String {
    "openai/gpt-4o-mini".to_string()
}
fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}
fn default_read_batch_size() -> usize {
    READ_BATCH_SIZE
}
fn default_read_batch_timeout_secs() -> u64 {
    READ_BATCH_TIMEOUT_SECS
}
fn default_llm_batch_size() -> usize {
    20
}
fn default_realtime_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.ingest/realtime.json", home)
}
fn default_routing_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.ingest/routing.json", home)
}
fn default_prefilter_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.ingest/prefilter.json", home)
}
fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.ingest/ingest.toml", home)
}

impl IngestConfig {
    /// Load config from a TOML file with `INGEST_*` env var overrides.
    ///
    /// Field names mirror the historic bare env vars this was distilled from
    /// (`DATABASE_URL`, `RABBITMQ_HOST`, `WEIGHT_ALPHA`, …) via figment's
    /// nested `Env::prefixed(...).split("_")` mapping, so a `.toml` file and
    /// an environment-only deployment are equally valid.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: IngestConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("INGEST_").split("_"))
            .extract()
            .map_err(|e| crate::error::IngestError::Config(e.to_string()))?;

        Ok(config)
    }
}
