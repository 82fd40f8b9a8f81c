//! Keyword heuristics that pick a pipeline stage.
//!
//! Every check is a case-insensitive substring match against a fixed list.
//! Matching is literal: "date" also matches "update".

/// Phrases that ask for the current date or time.
pub const TIME_TRIGGERS: &[&str] = &[
    "time",
    "current time",
    "time right now",
    "what time is it",
    "what is the time",
    "time now",
    "date",
    "today's date",
    "current date",
];

/// Phrases that suggest the answer depends on fresh information.
pub const WEB_TRIGGERS: &[&str] = &[
    "current",
    "latest",
    "today",
    "now",
    "news",
    "price",
    "rate",
    "exchange",
    "usd",
    "pkr",
    "who is the current",
    "president",
    "prime minister",
    "cm of",
    "chief minister",
    "updated",
    "2024",
    "2025",
    "2026",
];

/// Phrases that clearly refer to the uploaded document.
pub const DOCUMENT_TRIGGERS: &[&str] = &[
    "this pdf",
    "this document",
    "this file",
    "uploaded pdf",
    "uploaded document",
    "resume",
    "cv",
    "in the pdf",
    "from the pdf",
    "from this document",
];

/// Question substituted for "summarize" style requests about a document.
pub const SUMMARY_QUESTION: &str =
    "Give a concise summary of this document. Include key sections and bullet points.";

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lower = text.trim().to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

pub fn needs_time(text: &str) -> bool {
    contains_any(text, TIME_TRIGGERS)
}

pub fn needs_web(text: &str) -> bool {
    contains_any(text, WEB_TRIGGERS)
}

pub fn looks_like_document_question(text: &str) -> bool {
    contains_any(text, DOCUMENT_TRIGGERS)
}

pub fn wants_summary(text: &str) -> bool {
    contains_any(text, &["summary", "summarize"])
}
