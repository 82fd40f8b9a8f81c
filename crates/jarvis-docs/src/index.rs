//! Session document index: extraction, chunking, storage and retrieval.

use std::path::Path;
use std::sync::Arc;

use jarvis_core::config::{DocumentConfig, SessionConfig};
use jarvis_core::Result;
use tracing::{debug, info};

use crate::chunker::{chunk_text, clean_text};
use crate::extract::{ExtensionExtractor, TextExtractor};
use crate::retriever::{LexicalRetriever, Retriever};
use crate::semantic::{HashingEmbedder, SemanticRetriever};
use crate::store::DocumentStore;

/// Indexes documents per session and retrieves relevant chunks.
pub struct DocumentIndex {
    store: DocumentStore,
    retriever: Box<dyn Retriever>,
    extractor: Arc<dyn TextExtractor>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentIndex {
    pub fn new(
        store: DocumentStore,
        retriever: Box<dyn Retriever>,
        extractor: Arc<dyn TextExtractor>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            store,
            retriever,
            extractor,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Build an index from configuration. Unknown backends fall back to lexical.
    pub fn from_config(docs: &DocumentConfig, sessions: &SessionConfig) -> Self {
        let retriever: Box<dyn Retriever> = match docs.backend.as_str() {
            "semantic" => Box::new(SemanticRetriever::new(HashingEmbedder::default())),
            _ => Box::new(LexicalRetriever::new()),
        };
        info!(backend = retriever.name(), "Document retriever selected");
        Self::new(
            DocumentStore::new(sessions.max_sessions, sessions.idle_timeout()),
            retriever,
            Arc::new(ExtensionExtractor::standard()),
            docs.chunk_size,
            docs.chunk_overlap,
        )
    }

    /// Unbounded lexical index with the given chunk geometry.
    pub fn lexical(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self::new(
            DocumentStore::unbounded(),
            Box::new(LexicalRetriever::new()),
            Arc::new(ExtensionExtractor::standard()),
            chunk_size,
            chunk_overlap,
        )
    }

    pub fn set_active(&self, session_id: &str, source_id: &str) {
        self.store.set_active(session_id, source_id);
    }

    pub fn active(&self, session_id: &str) -> Option<String> {
        self.store.active(session_id)
    }

    /// Clean, chunk and store `raw_text` as the session's active document.
    ///
    /// Returns the number of chunks. Empty text stores zero chunks but still
    /// activates `source_id`.
    pub fn index(&self, session_id: &str, raw_text: &str, source_id: &str) -> usize {
        self.index_pages(session_id, &[raw_text], source_id)
    }

    /// Like [`index`](Self::index) for pre-split pages; blank pages are dropped.
    pub fn index_pages<S: AsRef<str>>(&self, session_id: &str, pages: &[S], source_id: &str) -> usize {
        let text = pages
            .iter()
            .map(|p| clean_text(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk_text(&text, self.chunk_size, self.chunk_overlap);
        let count = chunks.len();
        self.store.replace(session_id, source_id, chunks);
        info!(session_id, source_id, chunks = count, "Document indexed");
        count
    }

    /// Extract `path` and index it. The source id defaults to the file name.
    pub fn index_file(&self, session_id: &str, path: &Path, source_id: Option<&str>) -> Result<usize> {
        let pages = self.extractor.extract(path)?;
        let fallback = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let source = source_id.unwrap_or(&fallback);
        Ok(self.index_pages(session_id, &pages, source))
    }

    /// At most `k` chunks of `source_id` (or the active document) ranked for
    /// `question`.
    pub fn retrieve(&self, session_id: &str, question: &str, k: usize, source_id: Option<&str>) -> Vec<String> {
        let chunks = self.store.chunks_for(session_id, source_id);
        if chunks.is_empty() {
            return Vec::new();
        }
        let ranked = self.retriever.rank(question, &chunks, k);
        debug!(session_id, candidates = chunks.len(), returned = ranked.len(), "Chunks retrieved");
        ranked
    }

    /// File extensions the configured extractor can read, lowercase.
    pub fn supported_extensions(&self) -> &[&'static str] {
        self.extractor.extensions()
    }
}
