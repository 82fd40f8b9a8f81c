//! Chunk ranking.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("Invalid token regex"));

/// Lowercase ASCII alphanumeric runs of `text`, as a set.
pub fn tokenize(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Ranks candidate chunks against a question.
pub trait Retriever: Send + Sync {
    /// Return at most `k` chunks from `chunks`, most relevant first.
    fn rank(&self, question: &str, chunks: &[String], k: usize) -> Vec<String>;

    fn name(&self) -> &'static str;
}

/// Token-overlap scorer.
///
/// A chunk's score is the size of the intersection between its token set and
/// the question's. Ties keep document order. When no chunk shares a single
/// token with the question, the first `k` chunks are returned in document
/// order so the caller still gets some context.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalRetriever;

impl LexicalRetriever {
    pub fn new() -> Self {
        Self
    }

    /// Overlap score of every chunk, in chunk order.
    pub fn scores(&self, question: &str, chunks: &[String]) -> Vec<usize> {
        let question_tokens = tokenize(question);
        chunks
            .iter()
            .map(|chunk| tokenize(chunk).intersection(&question_tokens).count())
            .collect()
    }
}

impl Retriever for LexicalRetriever {
    fn rank(&self, question: &str, chunks: &[String], k: usize) -> Vec<String> {
        if chunks.is_empty() || k == 0 {
            return Vec::new();
        }

        let scores = self.scores(question, chunks);
        let best = scores.iter().copied().max().unwrap_or(0);
        if best == 0 {
            return chunks.iter().take(k).cloned().collect();
        }

        let mut order: Vec<usize> = (0..chunks.len()).collect();
        // sort_by is stable, so equal scores keep document order.
        order.sort_by(|a, b| scores[*b].cmp(&scores[*a]));
        order
            .into_iter()
            .take(k)
            .map(|i| chunks[i].clone())
            .collect()
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}
