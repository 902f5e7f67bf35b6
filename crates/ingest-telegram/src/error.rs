/// Errors surfaced by the identity-session wrapper around the chat
/// platform's client library (grounds C5/C6's "connect to the chat
/// platform" step).
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("invocation failed: {0}")]
    Invocation(#[from] grammers_client::InvocationError),

    #[error("sign-in failed: {0}")]
    SignIn(String),

    #[error("session bytes could not be decoded: {0}")]
    BadSession(String),

    #[error("no credential available for this identity")]
    NoCredential,

    #[error("identity is not authorized; credential is stale or was never completed")]
    NotAuthorized,

    #[error("chat {0} not found in this identity's dialog list")]
    ChatNotFound(i64),
}

pub type Result<T> = std::result::Result<T, TelegramError>;
