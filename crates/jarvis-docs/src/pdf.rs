//! PDF text extraction backed by `lopdf`.

use std::path::Path;

use jarvis_core::{JarvisError, Result};
use lopdf::Document;
use tracing::{debug, warn};

use crate::extract::TextExtractor;

/// One string per PDF page, in page order.
///
/// Pages whose text cannot be decoded come back empty instead of failing the
/// whole document. A file that is not a readable PDF is an extraction error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let document = Document::load(path).map_err(|e| {
            JarvisError::Extraction(format!("cannot read PDF {}: {}", path.display(), e))
        })?;

        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        let mut texts = Vec::with_capacity(pages.len());
        for page in pages {
            match document.extract_text(&[page]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!(path = %path.display(), page, error = %e, "Skipping undecodable PDF page");
                    texts.push(String::new());
                }
            }
        }
        debug!(path = %path.display(), pages = texts.len(), "PDF extracted");
        Ok(texts)
    }

    fn extensions(&self) -> &[&'static str] {
        &["pdf"]
    }
}

/// Write a minimal PDF with one line of Courier text per page.
///
/// Fixture support for tests in this and downstream crates.
#[cfg(any(test, feature = "test-support"))]
pub fn write_pdf_with_lines(path: &Path, pages: &[&str]) -> Result<()> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let encode_err = |e: lopdf::Error| JarvisError::Serialization(e.to_string());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let stream = Stream::new(dictionary! {}, content.encode().map_err(encode_err)?);
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}
