//! Web search providers for freshness-sensitive questions.

pub mod duckduckgo;
pub mod error;
pub mod fixed;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use duckduckgo::DuckDuckGoSearch;
pub use error::SearchError;
pub use fixed::StaticSearch;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// A web search backend.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Return at most `max_results` hits for `query`, best first.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// Render hits as a bulleted source list for a grounding prompt.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| format!("- {}\n  {}\n  {}", h.title, h.url, h.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}
