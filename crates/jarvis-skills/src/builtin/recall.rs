use std::sync::Arc;

use async_trait::async_trait;
use jarvis_storage::MemoryStore;

use crate::error::SkillError;
use crate::skill::{Skill, SkillContext};

pub const NO_MEMORIES: &str = "I don’t have any saved memories about you yet.";

/// Lists saved memories or answers a question from them.
pub struct RecallSkill {
    store: Arc<dyn MemoryStore>,
}

impl RecallSkill {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|m| format!("- {m}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Skill for RecallSkill {
    fn command(&self) -> &str {
        "/recall"
    }

    fn description(&self) -> &str {
        "Recall saved memories"
    }

    async fn run(&self, arg: &str, ctx: &SkillContext) -> Result<String, SkillError> {
        let memories = self.store.memories(&ctx.session_id)?;
        if memories.is_empty() {
            return Ok(NO_MEMORIES.to_string());
        }

        let question = arg.trim().to_lowercase();
        if question.is_empty() || question.contains("everything") || question.contains("remember")
        {
            return Ok(format!(
                "Here’s what I remember about you:\n{}",
                bullet_list(&memories)
            ));
        }

        let prompt = format!(
            "You are a memory assistant.\n\
             From the list of memories below, answer the user's question.\n\
             If none are relevant, say you don't know.\n\n\
             Memories:\n{}\n\nQuestion: {}\nAnswer:",
            bullet_list(&memories),
            question
        );
        let answer = ctx.llm.prompt(&prompt).await?;
        Ok(answer.trim().to_string())
    }
}
