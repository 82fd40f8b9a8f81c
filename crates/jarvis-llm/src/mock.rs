//! Deterministic language model for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use jarvis_core::ChatMessage;

use crate::error::LlmError;
use crate::LanguageModel;

#[derive(Debug, Clone)]
enum Behavior {
    /// Reply `"echo: <last message content>"`.
    Echo,
    /// Pop scripted replies in order, then fall back to echo.
    Scripted,
    /// Always fail.
    Failing(String),
}

/// In-memory model that records every call it receives.
#[derive(Debug)]
pub struct MockLanguageModel {
    behavior: Behavior,
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLanguageModel {
    /// Reply with `echo: ` followed by the last message's content.
    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo, Vec::new())
    }

    /// Return the given replies in order; echo once they run out.
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_behavior(
            Behavior::Scripted,
            replies.into_iter().map(Into::into).collect(),
        )
    }

    /// Fail every call with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Failing(message.into()), Vec::new())
    }

    fn with_behavior(behavior: Behavior, replies: Vec<String>) -> Self {
        Self {
            behavior,
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every message list passed to `invoke`, oldest first.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Content of the final message of the most recent call.
    pub fn last_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .ok()
            .and_then(|c| c.last().and_then(|m| m.last()).map(|m| m.content.clone()))
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }

        let echo = || {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            format!("echo: {last}")
        };

        match &self.behavior {
            Behavior::Echo => Ok(echo()),
            Behavior::Scripted => {
                let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
                Ok(next.unwrap_or_else(echo))
            }
            Behavior::Failing(msg) => Err(LlmError::NotConfigured(msg.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_replies_with_last_message() {
        let llm = MockLanguageModel::echo();
        let reply = llm
            .invoke(&[ChatMessage::system("sys"), ChatMessage::user("hello")])
            .await
            .unwrap();
        assert_eq!(reply, "echo: hello");
        assert_eq!(llm.call_count(), 1);
        assert_eq!(llm.calls()[0].len(), 2);
    }

    #[tokio::test]
    async fn test_scripted_then_echo() {
        let llm = MockLanguageModel::scripted(["one", "two"]);
        assert_eq!(llm.prompt("a").await.unwrap(), "one");
        assert_eq!(llm.prompt("b").await.unwrap(), "two");
        assert_eq!(llm.prompt("c").await.unwrap(), "echo: c");
        assert_eq!(llm.last_prompt().as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_failing_records_call() {
        let llm = MockLanguageModel::failing("offline");
        assert!(llm.prompt("x").await.is_err());
        assert_eq!(llm.call_count(), 1);
    }
}
