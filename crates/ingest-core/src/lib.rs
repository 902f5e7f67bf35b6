//! `ingest-core` — shared config, error, and domain types for the chat
//! ingestion/classification/routing pipeline.

pub mod config;
pub mod error;
pub mod realtime_config;
pub mod types;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
