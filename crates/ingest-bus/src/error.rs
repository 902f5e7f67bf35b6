use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("consume failed: {0}")]
    ConsumeFailed(String),

    #[error("AMQP protocol error: {0}")]
    Protocol(#[from] lapin::Error),
}

impl BusError {
    pub fn code(&self) -> &'static str {
        match self {
            BusError::ConnectionFailed(_) => "BUS_CONNECTION_FAILED",
            BusError::PublishFailed(_) => "BUS_PUBLISH_FAILED",
            BusError::ConsumeFailed(_) => "BUS_CONSUME_FAILED",
            BusError::Protocol(_) => "BUS_PROTOCOL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, BusError>;
