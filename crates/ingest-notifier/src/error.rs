/// Errors produced by the notifier (C12). Delivery failures are logged and
/// swallowed by the caller — ingestion is never blocked (§4.12, §7).
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("telegram bot API error: {0}")]
    Bot(#[from] teloxide::RequestError),

    #[error("no bot token configured")]
    NoToken,
}

pub type Result<T> = std::result::Result<T, NotifierError>;
