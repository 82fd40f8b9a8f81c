//! Embedding-based retrieval strategy.
//!
//! [`SemanticRetriever`] ranks chunks by cosine similarity between embedded
//! question and chunk vectors. It plugs in behind the same [`Retriever`]
//! interface as the lexical scorer and is selected with
//! `documents.backend = "semantic"`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::retriever::{tokenize, Retriever};

/// Produces fixed-dimension text embeddings.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;

    fn dimensions(&self) -> usize;
}

/// Feature-hashed bag-of-words embedding.
///
/// Each token increments one bucket chosen by its hash; the vector is then
/// L2-normalized. Deterministic and dependency free, which keeps the semantic
/// backend usable offline.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Cosine similarity of two vectors; zero when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

pub struct SemanticRetriever<E: Embedder> {
    embedder: E,
}

impl<E: Embedder> SemanticRetriever<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }
}

impl<E: Embedder> Retriever for SemanticRetriever<E> {
    fn rank(&self, question: &str, chunks: &[String], k: usize) -> Vec<String> {
        if chunks.is_empty() || k == 0 {
            return Vec::new();
        }

        let query = self.embedder.embed(question);
        let scores: Vec<f32> = chunks
            .iter()
            .map(|c| cosine_similarity(&query, &self.embedder.embed(c)))
            .collect();

        let mut order: Vec<usize> = (0..chunks.len()).collect();
        order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
        order
            .into_iter()
            .take(k)
            .map(|i| chunks[i].clone())
            .collect()
    }

    fn name(&self) -> &'static str {
        "semantic"
    }
}
