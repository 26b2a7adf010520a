//! Batched chat-completion adapters that fill the hint and Jyutping caches.

pub mod batch;
pub mod hints;
pub mod jyutping;
#[cfg(feature = "llm")]
pub mod openrouter;

use serde_json::{Map, Value};
use thiserror::Error;

pub use batch::{run_batches, BatchConfig, BatchReport};
#[cfg(feature = "llm")]
pub use openrouter::OpenRouterClient;

/// Chat backend errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[cfg(feature = "llm")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key not set ({0})")]
    MissingApiKey(&'static str),
}

/// A chat model that answers with a single JSON object.
pub trait ChatBackend: Send + Sync {
    fn complete_json(&self, system: &str, prompt: &str) -> Result<Map<String, Value>, LlmError>;
}

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Decode model output that must be a JSON object.
pub fn parse_json_object(content: &str) -> Result<Map<String, Value>, LlmError> {
    match serde_json::from_str::<Value>(strip_code_fences(content))? {
        Value::Object(map) => Ok(map),
        other => Err(LlmError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            truncate(&other.to_string(), 100)
        ))),
    }
}

/// First `max` characters of `text`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
