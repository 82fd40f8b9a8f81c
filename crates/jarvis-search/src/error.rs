/// Errors from a web search backend.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search provider returned HTTP {0}")]
    Status(u16),

    #[error("invalid search response: {0}")]
    InvalidResponse(String),

    #[error("search unavailable: {0}")]
    Unavailable(String),
}
