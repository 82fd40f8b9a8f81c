use std::sync::Arc;

use async_trait::async_trait;
use jarvis_storage::MemoryStore;

use crate::error::SkillError;
use crate::skill::{Skill, SkillContext};

/// `/notes` lists notes (or adds one when given text); `/clear_notes` clears them.
pub struct NotesSkill {
    store: Arc<dyn MemoryStore>,
}

impl NotesSkill {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Skill for NotesSkill {
    fn command(&self) -> &str {
        "/notes"
    }

    fn aliases(&self) -> &[&str] {
        &["/clear_notes"]
    }

    fn description(&self) -> &str {
        "List, add or clear notes"
    }

    async fn run(&self, arg: &str, ctx: &SkillContext) -> Result<String, SkillError> {
        if ctx.invoked == "/clear_notes" {
            self.store.clear_notes(&ctx.session_id)?;
            return Ok("✅ All notes cleared.".to_string());
        }

        let text = arg.trim();
        if !text.is_empty() {
            self.store.add_note(&ctx.session_id, text)?;
            return Ok("✅ Note saved.".to_string());
        }

        let notes = self.store.notes(&ctx.session_id)?;
        if notes.is_empty() {
            return Ok("🗒️ No notes saved yet.".to_string());
        }
        let listing = notes
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{}) {}", i + 1, n))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!("🗒️ Notes:\n{listing}"))
    }
}
