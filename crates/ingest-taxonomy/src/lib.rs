//! `ingest-taxonomy` — the intent/domain/subcategory code tables and the
//! LLM's compact-line response protocol codec.

pub mod codes;
pub mod compact;

pub use codes::{Domain, Intent};
pub use compact::{parse_compact_batch_partial, parse_compact_line, ClassifiedMessage, CompactParseError, DomainInfo, LineError};
