//! Error types for the chat pipeline.

use jarvis_core::JarvisError;
use jarvis_llm::LlmError;

/// Errors that reach the caller of [`ChatPipeline::handle`](crate::ChatPipeline::handle).
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<JarvisError> for ChatError {
    fn from(err: JarvisError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(4000).to_string(),
            "message exceeds maximum length of 4000 characters"
        );
        assert_eq!(
            ChatError::Llm(LlmError::Empty).to_string(),
            "LLM error: model returned an empty reply"
        );
    }

    #[test]
    fn test_chat_error_from_jarvis_error() {
        let err: ChatError = JarvisError::Storage("corrupt".to_string()).into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert!(err.to_string().contains("corrupt"));
    }
}
