use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-account identity capable of listening to or backfilling chats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IdentityId(pub String);

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An optional geographic tag attached to a source chat, used by the router's
/// location-override matching.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Location {
    pub city: Option<String>,
    pub district: Option<String>,
}

/// A source chat the pipeline listens to, as resolved from the realtime config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceChat {
    pub chat_id: i64,
    pub identifier: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// Which bus lane a payload was published on (§6 envelope `event` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusEventKind {
    NewMessage,
    HistoricalMessage,
}

/// Raw payload as it crosses the bus (§6 envelope shape). Handles are read
/// only from fields already present in the source event — C5/C6 never do
/// an extra network lookup to fill them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessagePayload {
    pub event: BusEventKind,
    pub chat_id: i64,
    pub message_id: i64,
    pub message: RawMessageBody,
    #[serde(default)]
    pub sender_username: Option<String>,
    #[serde(default)]
    pub chat_username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessageBody {
    pub message: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub sender_id: Option<i64>,
}

/// One classified domain + the subcategories matched within it (§3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainClassification {
    pub domain: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

/// Fully enriched row as written by the persister (C10), mirroring the
/// `messages` table columns in §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender_id: Option<i64>,
    pub sender_username: Option<String>,
    pub chat_username: Option<String>,
    pub text: String,
    pub intents: Vec<String>,
    pub domains: Vec<DomainClassification>,
    pub urgency_score: i32,
    pub is_spam: bool,
    pub reasoning: String,
    pub llm_analysis: serde_json::Value,
    pub openrouter_response: Option<serde_json::Value>,
    pub message_date: DateTime<Utc>,
}

/// Identity → assigned chat-ids, plus the monotonically-increasing version
/// the store bumps on every `write_all` (§4.2, §AS-1).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Assignment {
    pub identity_id: String,
    pub chat_ids: Vec<i64>,
    pub version: i64,
    pub last_summary: Option<String>,
}
