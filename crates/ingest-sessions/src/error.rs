use thiserror::Error;

/// Errors produced by the session store (C1).
#[derive(Debug, Error)]
pub enum SessionError {
    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No crypto key is configured; `put` refuses to store plaintext blindly.
    #[error("crypto key is not configured")]
    NoKey,

    /// The configured crypto key is not valid base64 / not 32 bytes.
    #[error("crypto key is malformed: {0}")]
    BadKey(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
