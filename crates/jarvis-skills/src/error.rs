//! Error types for skill execution.

use jarvis_core::JarvisError;
use jarvis_llm::LlmError;

/// Errors from a skill's `run`.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("language model error: {0}")]
    Llm(#[from] LlmError),
    #[error("storage error: {0}")]
    Storage(#[from] JarvisError),
    #[error("skill failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_error_display() {
        let err = SkillError::InvalidArgument("empty".to_string());
        assert_eq!(err.to_string(), "invalid argument: empty");

        let err: SkillError = LlmError::Empty.into();
        assert_eq!(
            err.to_string(),
            "language model error: model returned an empty reply"
        );

        let err: SkillError = JarvisError::Storage("disk full".to_string()).into();
        assert!(matches!(err, SkillError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
