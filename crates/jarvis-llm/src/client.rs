//! OpenAI-compatible chat completion client.
//!
//! Works with any endpoint that accepts the OpenAI `/chat/completions`
//! request shape (OpenRouter, OpenAI, Groq, local gateways).

use async_trait::async_trait;
use jarvis_core::config::LlmConfig;
use jarvis_core::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::LanguageModel;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Language model backed by an OpenAI-compatible HTTP API.
pub struct OpenAiCompatClient {
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a client with an explicit API key.
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a client, reading the API key from the configured environment
    /// variable.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let key = config
            .resolve_api_key()
            .map_err(|e| LlmError::NotConfigured(e.to_string()))?;
        Ok(Self::new(config, key))
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        debug!(
            model = %self.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chat completion request failed");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        extract_reply(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn extract_reply(response: CompletionResponse) -> Result<String, LlmError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(LlmError::Empty)?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(LlmError::Empty);
    }
    Ok(trimmed.to_string())
}
