//! Automatic skill routing for free text.

use std::sync::Arc;

use jarvis_docs::DocumentIndex;
use jarvis_llm::LanguageModel;
use jarvis_skills::{SkillContext, SkillRegistry};
use tracing::{debug, warn};

use crate::triggers::looks_like_document_question;

/// Prefix that explicitly sends the rest of the text to the document skill.
pub const DOCUMENT_PREFIX: &str = "/pdf";

/// Tokens tried, in order, when looking up the document skill.
pub const DOCUMENT_SKILL_TOKENS: &[&str] = &["/pdf", "/doc"];

pub const DOCUMENT_SKILL_MISSING: &str = "Document skill not registered";

/// Free-text prefixes that save a memory, longest first.
const REMEMBER_PREFIXES: &[&str] = &["remember that ", "remember "];

/// Words that turn `remember ...` into a recall question instead of a fact.
const RECALL_QUESTION_WORDS: &[&str] = &[
    "what", "when", "where", "who", "whom", "whose", "why", "which", "how", "if", "whether",
];

/// `remember what we discussed?` asks about the past; it must not be saved.
fn is_recall_question(fact: &str) -> bool {
    if fact.trim_end().ends_with('?') {
        return true;
    }
    let first = fact
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    RECALL_QUESTION_WORDS.contains(&first.as_str())
}

/// Decides whether free text should be handed to a skill.
pub struct AutoRouter {
    registry: Arc<SkillRegistry>,
    documents: Arc<DocumentIndex>,
}

impl AutoRouter {
    pub fn new(registry: Arc<SkillRegistry>, documents: Arc<DocumentIndex>) -> Self {
        Self {
            registry,
            documents,
        }
    }

    /// Route `text` to a skill, or return `None` so the caller continues.
    ///
    /// - Text starting with `/pdf` always goes to the document skill.
    /// - A document question goes to the document skill only when the session
    ///   has an active document.
    /// - `remember <fact>` saves a memory through `/remember`, unless the
    ///   text reads as a question about the past.
    pub async fn route(
        &self,
        text: &str,
        llm: Arc<dyn LanguageModel>,
        session_id: &str,
    ) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let lower = text.to_lowercase();

        if lower.starts_with(DOCUMENT_PREFIX) {
            let arg = text.get(DOCUMENT_PREFIX.len()..).unwrap_or("").trim();
            return Some(match self.document_token() {
                Some(token) => self.dispatch(token, arg, session_id, llm).await,
                None => DOCUMENT_SKILL_MISSING.to_string(),
            });
        }

        if self.documents.active(session_id).is_some() && looks_like_document_question(text) {
            if let Some(token) = self.document_token() {
                return Some(self.dispatch(token, text, session_id, llm).await);
            }
        }

        if self.registry.contains("/remember") {
            for prefix in REMEMBER_PREFIXES {
                if lower.starts_with(prefix) {
                    let fact = text.get(prefix.len()..).unwrap_or("").trim();
                    if fact.is_empty() || is_recall_question(fact) {
                        break;
                    }
                    return Some(self.dispatch("/remember", fact, session_id, llm).await);
                }
            }
        }

        None
    }

    fn document_token(&self) -> Option<&'static str> {
        DOCUMENT_SKILL_TOKENS
            .iter()
            .copied()
            .find(|t| self.registry.contains(t))
    }

    async fn dispatch(
        &self,
        token: &str,
        arg: &str,
        session_id: &str,
        llm: Arc<dyn LanguageModel>,
    ) -> String {
        let Some(skill) = self.registry.get(token) else {
            return format!("{} is not registered", token);
        };
        let ctx = SkillContext {
            session_id: session_id.to_string(),
            invoked: token.to_string(),
            commands: self.registry.tokens(),
            llm,
        };
        debug!(session_id, token, "Auto-routing to skill");
        match skill.run(arg, &ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(token, error = %e, "Auto-routed skill failed");
                format!("❌ {} failed: {}", token, e)
            }
        }
    }
}
