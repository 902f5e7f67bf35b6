use serde::Serialize;

/// Error kinds surfaced by the bulk classifier (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmErrorKind {
    MissingApiKey,
    EmptyBatch,
    BatchTooLarge,
    InvalidFormat,
    EmptyResponse,
    NoContent,
    ParseError,
    Timeout,
    HttpError,
    RequestError,
    UnexpectedError,
}

impl LlmErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LlmErrorKind::MissingApiKey => "missing_api_key",
            LlmErrorKind::EmptyBatch => "empty_batch",
            LlmErrorKind::BatchTooLarge => "batch_too_large",
            LlmErrorKind::InvalidFormat => "invalid_format",
            LlmErrorKind::EmptyResponse => "empty_response",
            LlmErrorKind::NoContent => "no_content",
            LlmErrorKind::ParseError => "parse_error",
            LlmErrorKind::Timeout => "timeout",
            LlmErrorKind::HttpError => "http_error",
            LlmErrorKind::RequestError => "request_error",
            LlmErrorKind::UnexpectedError => "unexpected_error",
        }
    }
}

/// A whole-batch failure (§4.8 step 6, `{ ok=false, ... }`).
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyFailure {
    pub kind: LlmErrorKind,
    pub status: Option<u16>,
    pub body: Option<String>,
    pub message: String,
}

impl ClassifyFailure {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            body: None,
            message: message.into(),
        }
    }

    pub fn with_http(kind: LlmErrorKind, status: u16, body: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: Some(status),
            body: Some(body.into()),
            message: message.into(),
        }
    }

    /// The ingestor requeues (rather than persists-with-error) only on
    /// `http_error` in 400..=599 (§4.9 step 5).
    pub fn should_requeue(&self) -> bool {
        self.kind == LlmErrorKind::HttpError
            && matches!(self.status, Some(s) if (400..600).contains(&s))
    }
}
