//! Error types for language model calls.

/// Errors from a language model backend.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Missing API key or endpoint.
    #[error("language model not configured: {0}")]
    NotConfigured(String),

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The model returned no choices or an empty message.
    #[error("model returned an empty reply")]
    Empty,
}
