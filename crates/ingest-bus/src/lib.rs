//! `ingest-bus` — the two durable AMQP fanout lanes §6 requires
//! (`realtime_fanout`/`realtime_raw`, `historical_fanout`/`historical_raw`).

pub mod bus;
pub mod error;
pub mod reconnect;
pub mod types;

pub use bus::{ack, drop_without_requeue, requeue, Bus};
pub use error::{BusError, Result};
pub use reconnect::{connect_once, connect_with_backoff};
pub use types::Lane;
