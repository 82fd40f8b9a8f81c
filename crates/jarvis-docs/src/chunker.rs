//! Text normalization and overlapping chunking.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_OR_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{Cc}]+").expect("Invalid whitespace regex"));

/// Collapse every run of whitespace and control characters to a single space
/// and trim both ends.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_OR_CONTROL
        .replace_all(text, " ")
        .trim()
        .to_string()
}

/// Split `text` into chunks of `chunk_size` characters where consecutive
/// chunks share `overlap` characters.
///
/// The window advances by `chunk_size - overlap` (at least one character)
/// until it starts at or past the end of the text, so the last chunk may be
/// shorter. Lengths are in characters, never splitting a UTF-8 sequence.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::with_capacity(chars.len() / step + 1);

    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += step;
    }
    chunks
}
