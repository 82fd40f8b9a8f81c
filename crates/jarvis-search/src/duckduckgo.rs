//! DuckDuckGo Instant Answer search.

use async_trait::async_trait;
use jarvis_core::config::WebSearchConfig;
use serde::Deserialize;
use tracing::debug;

use crate::error::SearchError;
use crate::{SearchHit, WebSearch};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

/// A related topic is either a leaf result or a named group of results.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "FirstURL")]
    first_url: String,
    #[serde(rename = "Topics")]
    topics: Vec<RelatedTopic>,
}

/// Search client for the DuckDuckGo Instant Answer JSON API.
pub struct DuckDuckGoSearch {
    endpoint: String,
    http: reqwest::Client,
}

impl DuckDuckGoSearch {
    pub fn new(config: &WebSearchConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        debug!(query, max_results, "Running web search");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let answer: InstantAnswer = serde_json::from_str(&body)
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
        Ok(collect_hits(answer, max_results))
    }
}

fn collect_hits(answer: InstantAnswer, max_results: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if !answer.abstract_text.is_empty() {
        let title = if answer.heading.is_empty() {
            answer.abstract_text.clone()
        } else {
            answer.heading.clone()
        };
        hits.push(SearchHit::new(title, answer.abstract_url, answer.abstract_text));
    }

    let mut stack: Vec<RelatedTopic> = answer.related_topics.into_iter().rev().collect();
    while let Some(topic) = stack.pop() {
        if hits.len() >= max_results {
            break;
        }
        if !topic.topics.is_empty() {
            stack.extend(topic.topics.into_iter().rev());
            continue;
        }
        if topic.text.is_empty() {
            continue;
        }
        let title = topic
            .text
            .split(" - ")
            .next()
            .unwrap_or(&topic.text)
            .to_string();
        hits.push(SearchHit::new(title, topic.first_url, topic.text));
    }

    hits.truncate(max_results);
    hits
}
