use async_trait::async_trait;
use jarvis_docs::DocumentQa;

use crate::error::SkillError;
use crate::skill::{Skill, SkillContext};

pub const DOCUMENT_USAGE: &str = "Usage: /pdf <your question>";

/// Answers questions about the session's active document.
pub struct DocumentSkill {
    qa: DocumentQa,
    top_k: usize,
}

impl DocumentSkill {
    pub fn new(qa: DocumentQa, top_k: usize) -> Self {
        Self { qa, top_k }
    }
}

#[async_trait]
impl Skill for DocumentSkill {
    fn command(&self) -> &str {
        "/pdf"
    }

    fn aliases(&self) -> &[&str] {
        &["/doc"]
    }

    fn description(&self) -> &str {
        "Ask a question about the uploaded document"
    }

    async fn run(&self, arg: &str, ctx: &SkillContext) -> Result<String, SkillError> {
        let question = arg.trim();
        if question.is_empty() {
            return Ok(DOCUMENT_USAGE.to_string());
        }
        let answer = self
            .qa
            .answer(ctx.llm.as_ref(), &ctx.session_id, question, self.top_k, None)
            .await?;
        Ok(answer)
    }
}
