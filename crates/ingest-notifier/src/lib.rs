//! `ingest-notifier` — the notifier (C12): formats and posts a short signal
//! to a human-facing Telegram chat for every classified message the router
//! flags for it. A delivery failure is logged and swallowed; ingestion never
//! blocks on it.

pub mod error;
pub mod send;

pub use error::{NotifierError, Result};
pub use send::{format_signal, send, send_checked};
