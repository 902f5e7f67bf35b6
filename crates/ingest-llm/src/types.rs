use serde::Serialize;

use ingest_taxonomy::{ClassifiedMessage, LineError};

use crate::error::ClassifyFailure;

/// One message handed to the classifier, keyed by the caller's own id
/// (usually the bus delivery tag or `chat_id:message_id`).
#[derive(Debug, Clone)]
pub struct ClassifyItem {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Successful bulk-classify result (§4.8 step 6, `{ ok=true, ... }`).
#[derive(Debug, Clone)]
pub struct ClassifySuccess {
    /// Caller id -> decoded classification, remapped from the renumbered
    /// protocol ids back to the ids `classify` was called with.
    pub classified_messages: Vec<(String, ClassifiedMessage)>,
    pub parse_errors: Vec<LineError>,
    pub usage: Usage,
    pub raw: serde_json::Value,
}

pub type ClassifyOutcome = Result<ClassifySuccess, ClassifyFailure>;
