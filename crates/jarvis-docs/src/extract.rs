//! Document text extraction.

use std::path::Path;
use std::sync::Arc;

use jarvis_core::{JarvisError, Result};

use crate::pdf::PdfExtractor;

/// Extracts per-page text from a file on disk.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Vec<String>>;

    /// Lowercase file extensions this extractor understands.
    fn extensions(&self) -> &[&'static str];
}

/// Extractor for plain-text files.
///
/// Invalid UTF-8 is replaced rather than rejected. Form feeds split pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path).map_err(|e| {
            JarvisError::Extraction(format!("cannot read {}: {}", path.display(), e))
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.split('\u{000C}').map(str::to_string).collect())
    }

    fn extensions(&self) -> &[&'static str] {
        &["txt", "md", "markdown", "csv", "log"]
    }
}

/// Dispatches to the first registered extractor claiming the file's extension.
pub struct ExtensionExtractor {
    extractors: Vec<Arc<dyn TextExtractor>>,
    extensions: Vec<&'static str>,
}

impl ExtensionExtractor {
    pub fn new(extractors: Vec<Arc<dyn TextExtractor>>) -> Self {
        let mut extensions: Vec<&'static str> = Vec::new();
        for extractor in &extractors {
            for ext in extractor.extensions() {
                if !extensions.contains(ext) {
                    extensions.push(ext);
                }
            }
        }
        Self {
            extractors,
            extensions,
        }
    }

    /// Plain text and PDF.
    pub fn standard() -> Self {
        Self::new(vec![Arc::new(PlainTextExtractor), Arc::new(PdfExtractor)])
    }
}

impl Default for ExtensionExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

impl TextExtractor for ExtensionExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let extractor = self
            .extractors
            .iter()
            .find(|x| x.extensions().contains(&ext.as_str()))
            .ok_or_else(|| {
                JarvisError::Extraction(format!("unsupported file type: {}", path.display()))
            })?;
        extractor.extract(path)
    }

    fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }
}
