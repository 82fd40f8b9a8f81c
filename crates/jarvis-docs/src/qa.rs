//! Grounded question answering over the session's active document.

use std::sync::Arc;

use jarvis_llm::{LanguageModel, LlmError};
use tracing::debug;

use crate::index::DocumentIndex;

/// Separator placed between retrieved chunks in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Sentence the model is told to use when the context lacks the answer.
pub const UNKNOWN_ANSWER: &str = "I don't know from this document.";

pub const NO_DOCUMENT_MESSAGE: &str = "No document uploaded yet. Upload a document first.";

/// Answers questions using only retrieved document chunks as context.
#[derive(Clone)]
pub struct DocumentQa {
    index: Arc<DocumentIndex>,
}

impl DocumentQa {
    pub fn new(index: Arc<DocumentIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<DocumentIndex> {
        &self.index
    }

    /// Answer `question` from the top `k` chunks of `source_id` (or the active
    /// document).
    ///
    /// Missing documents and empty retrievals produce guidance text rather
    /// than errors. Model failures propagate.
    pub async fn answer(
        &self,
        llm: &dyn LanguageModel,
        session_id: &str,
        question: &str,
        k: usize,
        source_id: Option<&str>,
    ) -> Result<String, LlmError> {
        let chunks = self.index.retrieve(session_id, question, k, source_id);

        if chunks.is_empty() {
            return Ok(match self.index.active(session_id) {
                None => NO_DOCUMENT_MESSAGE.to_string(),
                Some(active) => format!(
                    "I couldn't find relevant text in the active document ({active}). \
                     Try a more specific question."
                ),
            });
        }

        debug!(session_id, chunks = chunks.len(), "Answering from document context");
        let prompt = grounding_prompt(&chunks.join(CONTEXT_SEPARATOR), question);
        llm.prompt(&prompt).await
    }
}

fn grounding_prompt(context: &str, question: &str) -> String {
    format!(
        "You are Jarvis. Answer using ONLY the context from the uploaded document.\n\
         If the answer is not in the context, say: '{UNKNOWN_ANSWER}'\n\n\
         Context:\n{context}\n\n\
         Question:\n{question}\n\n\
         Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_llm::MockLanguageModel;

    fn qa() -> DocumentQa {
        DocumentQa::new(Arc::new(DocumentIndex::lexical(40, 10)))
    }

    #[tokio::test]
    async fn test_no_document_guidance() {
        let qa = qa();
        let llm = MockLanguageModel::echo();
        let answer = qa.answer(&llm, "s1", "what?", 4, None).await.unwrap();
        assert_eq!(answer, NO_DOCUMENT_MESSAGE);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_active_but_empty_document_names_source() {
        let qa = qa();
        qa.index().index("s1", "", "empty.txt");
        let llm = MockLanguageModel::echo();
        let answer = qa.answer(&llm, "s1", "what?", 4, None).await.unwrap();
        assert!(answer.contains("(empty.txt)"));
        assert!(answer.contains("more specific question"));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_contains_context_and_question() {
        let qa = qa();
        qa.index().index(
            "s1",
            "The invoice is due on March 3rd. Payment goes to ACME Corp via wire.",
            "invoice.txt",
        );
        let llm = MockLanguageModel::scripted(["March 3rd"]);
        let answer = qa.answer(&llm, "s1", "when is the invoice due", 2, None).await.unwrap();
        assert_eq!(answer, "March 3rd");

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.starts_with("You are Jarvis. Answer using ONLY the context"));
        assert!(prompt.contains(UNKNOWN_ANSWER));
        assert!(prompt.contains(CONTEXT_SEPARATOR));
        assert!(prompt.contains("Question:\nwhen is the invoice due"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let qa = qa();
        qa.index().index("s1", "some content here", "a.txt");
        let llm = MockLanguageModel::failing("quota");
        assert!(qa.answer(&llm, "s1", "content", 4, None).await.is_err());
    }
}
