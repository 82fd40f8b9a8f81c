//! Canned search backend, used offline and in tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SearchError;
use crate::{SearchHit, WebSearch};

/// Returns a fixed result list (or a fixed failure) for every query.
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    failure: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            failure: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Backend with no results; used when web search is disabled.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            hits: Vec::new(),
            failure: Some(message.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        if let Some(msg) = &self.failure {
            return Err(SearchError::Unavailable(msg.clone()));
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}
