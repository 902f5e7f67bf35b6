use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{IngestError, Result};
use crate::types::{Location, SourceChat};

/// One configured MTProto user account (§6 realtime config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntry {
    pub account_id: String,
    pub phone: String,
    #[serde(default)]
    pub twofa: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatEntry {
    chat_id: Option<i64>,
    identifier: Option<String>,
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RealtimeConfigFile {
    accounts: Vec<AccountEntry>,
    chats: Vec<ChatEntry>,
}

/// Parsed realtime config: the account roster and the fixed chat universe.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub accounts: Vec<AccountEntry>,
    pub chats: Vec<SourceChat>,
}

/// Load and validate the realtime accounts/chats config.
///
/// `chat_id` wins over `identifier` when both are present; numeric-string
/// identifiers (e.g. `"-100123"`) are tolerated as a `chat_id` substitute.
/// A chat entry with neither resolves to a load error.
pub fn load_realtime_config(path: &Path) -> Result<RealtimeConfig> {
    let raw = fs::read_to_string(path)
        .map_err(|e| IngestError::Config(format!("reading realtime config {:?}: {e}", path)))?;
    let parsed: RealtimeConfigFile = serde_json::from_str(&raw)
        .map_err(|e| IngestError::Config(format!("parsing realtime config {:?}: {e}", path)))?;

    let mut chats = Vec::with_capacity(parsed.chats.len());
    for entry in parsed.chats {
        let chat_id = match entry.chat_id {
            Some(id) => id,
            None => match entry.identifier.as_deref().and_then(|s| s.parse::<i64>().ok()) {
                Some(id) => id,
                None => {
                    return Err(IngestError::Config(format!(
                        "chat entry has neither chat_id nor a numeric identifier: {:?}",
                        entry.identifier
                    )))
                }
            },
        };
        chats.push(SourceChat {
            chat_id,
            identifier: entry.identifier,
            locations: entry.locations,
        });
    }

    Ok(RealtimeConfig {
        accounts: parsed.accounts,
        chats,
    })
}
