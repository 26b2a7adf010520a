//! OpenRouter chat-completions client.

use std::time::Duration;

use serde_json::{json, Map, Value};

use super::{parse_json_object, truncate, ChatBackend, LlmError};
use crate::config::{LlmConfig, API_KEY_ENV};

pub struct OpenRouterClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(LlmError::MissingApiKey(API_KEY_ENV))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(OpenRouterClient {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }
}

impl ChatBackend for OpenRouterClient {
    fn complete_json(&self, system: &str, prompt: &str) -> Result<Map<String, Value>, LlmError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status(status.as_u16(), truncate(&body, 100)));
        }

        let body: Value = response.json()?;
        let content = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                LlmError::MalformedResponse(format!(
                    "no message content in {}",
                    truncate(&body.to_string(), 100)
                ))
            })?;
        parse_json_object(content)
    }
}
