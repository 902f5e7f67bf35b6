use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("routing configuration file not found: {0}")]
    NotFound(String),

    #[error("invalid JSON in routing configuration: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("routing configuration must have a 'fallback' chat_id (required)")]
    MissingFallback,

    #[error("I/O error reading routing configuration: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RouterError>;
