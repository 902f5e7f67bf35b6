use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use ingest_taxonomy::parse_compact_batch_partial;
use tracing::debug;

use crate::error::{ClassifyFailure, LlmErrorKind};
use crate::prompt::{system_prompt, user_prelude};
use crate::types::{ClassifyItem, ClassifyOutcome, ClassifySuccess, Usage};

const MAX_BODY_SNIPPET: usize = 500;
const CONNECT_TIMEOUT_SECS: u64 = 20;
const READ_TIMEOUT_SECS: u64 = 30;

/// Bulk classifier (C8): a single `classify(batch)` operation against a
/// remote chat-completion endpoint, using the compact-line protocol (§4.8).
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_batch_size: usize,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, model: String, max_batch_size: usize) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS + READ_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key,
            base_url,
            model,
            max_batch_size,
        }
    }

    /// Classifies up to `max_batch_size` messages in one HTTP round trip.
    ///
    /// Renumbers ids `"1".."N"` before sending to minimize output tokens,
    /// then remaps the decoded response back onto the caller's own ids.
    pub async fn classify(&self, batch: &[ClassifyItem]) -> ClassifyOutcome {
        if self.api_key.is_empty() {
            return Err(ClassifyFailure::new(LlmErrorKind::MissingApiKey, "no API key configured"));
        }
        if batch.is_empty() {
            return Err(ClassifyFailure::new(LlmErrorKind::EmptyBatch, "classify called with an empty batch"));
        }
        if batch.len() > self.max_batch_size {
            return Err(ClassifyFailure::new(
                LlmErrorKind::BatchTooLarge,
                format!("batch of {} exceeds max {}", batch.len(), self.max_batch_size),
            ));
        }

        let mut remap: HashMap<String, String> = HashMap::with_capacity(batch.len());
        let mut body_lines = String::new();
        for (idx, item) in batch.iter().enumerate() {
            let local_id = (idx + 1).to_string();
            remap.insert(local_id.clone(), item.id.clone());
            let one_line_text = item.text.replace('\n', " ").replace('\r', " ");
            let _ = writeln!(body_lines, "{local_id}: {one_line_text}");
        }

        let user_content = format!("{}{}", user_prelude(), body_lines);
        let max_tokens = batch.len() * 50;
        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt()},
                {"role": "user", "content": user_content},
            ],
            "temperature": 0.1,
            "max_tokens": max_tokens,
        });

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!(batch_len = batch.len(), %url, "dispatching classify batch");

        let response = match self.client.post(&url).bearer_auth(&self.api_key).json(&request_body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Err(ClassifyFailure::new(LlmErrorKind::Timeout, e.to_string()));
            }
            Err(e) => {
                return Err(ClassifyFailure::new(LlmErrorKind::RequestError, e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let snippet: String = body_text.chars().take(MAX_BODY_SNIPPET).collect();
            return Err(ClassifyFailure::with_http(
                LlmErrorKind::HttpError,
                status.as_u16(),
                snippet,
                format!("classifier endpoint returned HTTP {status}"),
            ));
        }

        let raw: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => return Err(ClassifyFailure::new(LlmErrorKind::InvalidFormat, e.to_string())),
        };

        let choices = raw.get("choices").and_then(|v| v.as_array());
        let Some(choices) = choices else {
            return Err(ClassifyFailure::new(LlmErrorKind::InvalidFormat, "response has no 'choices' array"));
        };
        let Some(first) = choices.first() else {
            return Err(ClassifyFailure::new(LlmErrorKind::EmptyResponse, "'choices' array is empty"));
        };

        let content = first
            .pointer("/message/content")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let Some(content) = content else {
            return Err(ClassifyFailure::new(LlmErrorKind::NoContent, "assistant message has no content"));
        };

        let usage = Usage {
            prompt_tokens: raw.pointer("/usage/prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
            completion_tokens: raw.pointer("/usage/completion_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
        };

        let (decoded, parse_errors) = parse_compact_batch_partial(content);
        let mut classified_messages = Vec::with_capacity(decoded.len());
        let mut unknown_ids = Vec::new();
        for msg in decoded {
            match remap.get(&msg.id) {
                Some(original_id) => classified_messages.push((original_id.clone(), msg)),
                None => unknown_ids.push(msg.id.clone()),
            }
        }
        if !unknown_ids.is_empty() {
            unknown_ids.sort();
            unknown_ids.dedup();
            return Err(ClassifyFailure::new(
                LlmErrorKind::ParseError,
                format!("unknown LLM ids in response: {unknown_ids:?}"),
            ));
        }

        // Remap parse errors to original ids when possible.
        let parse_errors = parse_errors
            .into_iter()
            .map(|mut err| {
                if let Some(original_id) = remap.get(&err.id) {
                    err.id = original_id.clone();
                }
                err
            })
            .collect();

        Ok(ClassifySuccess {
            classified_messages,
            parse_errors,
            usage,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_short_circuits_before_building_a_request() {
        let client = LlmClient::new(String::new(), "https://example.invalid".into(), "m".into(), 10);
        let outcome = tokio_test_block_on(client.classify(&[ClassifyItem {
            id: "1".into(),
            text: "hi".into(),
        }]));
        assert_eq!(outcome.unwrap_err().kind, LlmErrorKind::MissingApiKey);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let client = LlmClient::new("key".into(), "https://example.invalid".into(), "m".into(), 10);
        let outcome = tokio_test_block_on(client.classify(&[]));
        assert_eq!(outcome.unwrap_err().kind, LlmErrorKind::EmptyBatch);
    }

    #[test]
    fn batch_too_large_is_rejected() {
        let client = LlmClient::new("key".into(), "https://example.invalid".into(), "m".into(), 1);
        let items = vec![
            ClassifyItem { id: "1".into(), text: "a".into() },
            ClassifyItem { id: "2".into(), text: "b".into() },
        ];
        let outcome = tokio_test_block_on(client.classify(&items));
        assert_eq!(outcome.unwrap_err().kind, LlmErrorKind::BatchTooLarge);
    }

    fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
    }
}
