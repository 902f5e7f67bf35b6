use std::time::Duration;

use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::RequestError;
use tracing::{error, warn};

use crate::error::{NotifierError, Result};

const MAX_RETRIES: u32 = 3;

/// Formats the short block C12 posts to the destination chat: chat, author,
/// UTC timestamp, text, and an "open original" link when the source chat has
/// a public handle and the message id is known.
pub fn format_signal(
    text: &str,
    source_chat_id: i64,
    sender_id: Option<i64>,
    message_id: Option<i64>,
    sender_handle: Option<&str>,
    chat_handle: Option<&str>,
    message_date: Option<DateTime<Utc>>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Chat: {source_chat_id}\n"));
    match sender_handle {
        Some(h) => out.push_str(&format!("Author: @{h}\n")),
        None => out.push_str(&format!(
            "Author: id {}\n",
            sender_id.map(|i| i.to_string()).unwrap_or_else(|| "unknown".into())
        )),
    }
    if let Some(date) = message_date {
        out.push_str(&format!("When: {}\n", date.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    out.push('\n');
    out.push_str(text);

    if let (Some(handle), Some(mid)) = (chat_handle, message_id) {
        let handle = handle.trim_start_matches('@');
        out.push_str(&format!("\n\nhttps://t.me/{handle}/{mid}"));
    }
    out
}

/// Posts `text` to `target_chat_id`, retrying on rate-limit responses using
/// the upstream's own `retry_after` plus jitter, bounded by `MAX_RETRIES`.
/// Any other failure is logged and swallowed: delivery never blocks ingestion.
pub async fn send(bot: &Bot, target_chat_id: i64, text: &str) {
    let chat_id = ChatId(target_chat_id);
    let mut attempt = 0;

    loop {
        match bot.send_message(chat_id, text).await {
            Ok(_) => return,
            Err(RequestError::RetryAfter(retry_after)) if attempt < MAX_RETRIES => {
                attempt += 1;
                let jitter = Duration::from_millis((attempt as u64 * 137) % 500);
                let delay = retry_after.duration() + jitter;
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    target_chat_id,
                    "notifier rate limited, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                error!(error = %e, target_chat_id, "notifier delivery failed, dropping");
                return;
            }
        }
    }
}

/// Variant that surfaces the error instead of swallowing it, used by tests
/// and any caller that wants to react to a failed send itself.
pub async fn send_checked(bot: &Bot, target_chat_id: i64, text: &str) -> Result<()> {
    bot.send_message(ChatId(target_chat_id), text)
        .await
        .map(|_| ())
        .map_err(NotifierError::Bot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_includes_link_when_handle_and_id_present() {
        let msg = format_signal(
            "Looking for a plumber",
            -100555,
            Some(42),
            Some(7),
            None,
            Some("@somechat"),
            None,
        );
        assert!(msg.contains("https://t.me/somechat/7"));
        assert!(msg.contains("Looking for a plumber"));
    }

    #[test]
    fn format_omits_link_without_chat_handle() {
        let msg = format_signal("text", -100555, Some(1), Some(7), None, None, None);
        assert!(!msg.contains("t.me"));
    }

    #[test]
    fn format_falls_back_to_sender_id_without_handle() {
        let msg = format_signal("text", -100555, Some(99), None, None, None, None);
        assert!(msg.contains("id 99"));
    }
}
