use thiserror::Error;

/// Shared error type for the ingestion pipeline's core crate.
///
/// Every other crate in the workspace defines its own narrower error enum
/// (grounded on the same `.code()` pattern) and converts into this one only
/// at the glue points inside the binaries.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Bus error: {0}")]
    Bus(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("Channel error ({channel}): {reason}")]
    Channel { channel: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Request timeout after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// Short error code, mirrored in `llm_analysis`/log fields across crates.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::Config(_) => "CONFIG_ERROR",
            IngestError::Database(_) => "DATABASE_ERROR",
            IngestError::Bus(_) => "BUS_ERROR",
            IngestError::LlmProvider(_) => "LLM_PROVIDER_ERROR",
            IngestError::Channel { .. } => "CHANNEL_ERROR",
            IngestError::Serialization(_) => "SERIALIZATION_ERROR",
            IngestError::Io(_) => "IO_ERROR",
            IngestError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            IngestError::Timeout { .. } => "TIMEOUT",
            IngestError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
