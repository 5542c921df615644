//! LLM Client — the single point of entry for all model calls in the service.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! Callers depend on the `CompletionProvider` trait; the concrete client is
//! built once in `main` and injected through `AppState`.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
pub mod fake;
pub mod gemini;
pub mod prompts;

pub use gemini::GeminiClient;

/// Default model when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Network,
    Timeout,
    QuotaExceeded,
    EmptyResponse,
    Unknown,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderErrorKind::Network => "network error",
            ProviderErrorKind::Timeout => "timed out",
            ProviderErrorKind::QuotaExceeded => "quota exceeded",
            ProviderErrorKind::EmptyResponse => "empty response",
            ProviderErrorKind::Unknown => "provider error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {detail}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub detail: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, detail)
    }

    pub fn empty(detail: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::EmptyResponse, detail)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            ProviderErrorKind::Timeout
        } else if e.is_decode() {
            ProviderErrorKind::Unknown
        } else if e.is_connect() || e.is_request() || e.is_body() {
            ProviderErrorKind::Network
        } else {
            ProviderErrorKind::Unknown
        };
        Self::new(kind, e.to_string())
    }
}

/// Output-format hint passed through to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
}

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub response_format: Option<ResponseFormat>,
}

impl CompletionOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            response_format: None,
        }
    }

    pub fn with_response_format(mut self, format: Option<ResponseFormat>) -> Self {
        self.response_format = format;
        self
    }
}

/// Send a prompt to a text-generation model, get back its raw text.
///
/// One round trip per call. An empty body is an `EmptyResponse` error,
/// never an empty success.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ProviderError>;
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let rest = rest.trim_start();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
