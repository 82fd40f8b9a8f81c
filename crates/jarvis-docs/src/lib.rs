//! Per-session document indexing and grounded question answering.
//!
//! Text is extracted into pages, cleaned, split into overlapping chunks and
//! kept in memory per session. A [`Retriever`] ranks chunks for a question and
//! [`DocumentQa`] turns the best chunks into a grounded prompt.

pub mod chunker;
pub mod extract;
pub mod index;
pub mod pdf;
pub mod qa;
pub mod retriever;
pub mod semantic;
pub mod store;

pub use chunker::{chunk_text, clean_text};
pub use extract::{ExtensionExtractor, PlainTextExtractor, TextExtractor};
pub use index::DocumentIndex;
pub use pdf::PdfExtractor;
pub use qa::DocumentQa;
pub use retriever::{tokenize, LexicalRetriever, Retriever};
pub use semantic::{Embedder, HashingEmbedder, SemanticRetriever};
pub use store::{Chunk, DocumentStore};
