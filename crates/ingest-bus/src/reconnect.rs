use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::bus::Bus;
use crate::error::Result;

/// Minimum reconnect delay (§4.5: "reconnect with backoff (≥ 10 s)").
const BACKOFF_BASE_SECS: u64 = 10;
const BACKOFF_MAX_SECS: u64 = 300;

/// Connects to `amqp_uri` with unconditional exponential backoff — the
/// listener's reconnect loop never gives up (§5).
pub async fn connect_with_backoff(amqp_uri: &str) -> Bus {
    let mut delay = BACKOFF_BASE_SECS;
    loop {
        match Bus::connect(amqp_uri).await {
            Ok(bus) => return bus,
            Err(e) => {
                warn!(error = %e, retry_after_secs = delay, "bus connect failed, retrying");
                sleep(Duration::from_secs(delay)).await;
                delay = (delay * 2).min(BACKOFF_MAX_SECS);
            }
        }
    }
}

/// One-shot connect attempt, surfacing the error instead of looping forever
/// — used by one-shot jobs (C6, C13) that should fail rather than hang.
pub async fn connect_once(amqp_uri: &str) -> Result<Bus> {
    Bus::connect(amqp_uri).await
}
