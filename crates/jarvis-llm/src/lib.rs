//! Language model access for Jarvis.
//!
//! [`LanguageModel`] is the seam every other crate talks to. The production
//! implementation is [`OpenAiCompatClient`]; tests use [`MockLanguageModel`].

pub mod client;
pub mod error;
pub mod mock;

use async_trait::async_trait;
use jarvis_core::ChatMessage;

pub use client::OpenAiCompatClient;
pub use error::LlmError;
pub use mock::MockLanguageModel;

/// A chat-completion style language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send role-tagged messages and return the model's text reply.
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Send a single user prompt.
    async fn prompt(&self, prompt: &str) -> Result<String, LlmError> {
        self.invoke(&[ChatMessage::user(prompt)]).await
    }

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
