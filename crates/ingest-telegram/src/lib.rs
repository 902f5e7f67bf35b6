//! `ingest-telegram` — the thin wrapper around the MTProto client library
//! that C5 (listener) and C6 (backfiller) both build on: connect from a
//! stored session, list dialogs for eligibility, stream new messages, and
//! walk history newest-to-oldest.

pub mod client;
pub mod error;
pub mod types;

pub use client::{IdentityClient, ListenerEvent};
pub use error::{Result, TelegramError};
pub use types::{DialogChat, IncomingMessage};
