use std::sync::Arc;

use async_trait::async_trait;
use jarvis_storage::MemoryStore;
use tracing::info;

use crate::error::SkillError;
use crate::skill::{Skill, SkillContext};

pub const REMEMBER_USAGE: &str = "Usage: /remember <text> (or say: remember <text>)";

/// Persists a memory fact about the user.
pub struct RememberSkill {
    store: Arc<dyn MemoryStore>,
}

impl RememberSkill {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Skill for RememberSkill {
    fn command(&self) -> &str {
        "/remember"
    }

    fn description(&self) -> &str {
        "Save a memory"
    }

    async fn run(&self, arg: &str, ctx: &SkillContext) -> Result<String, SkillError> {
        let text = arg.trim();
        if text.is_empty() {
            return Ok(REMEMBER_USAGE.to_string());
        }
        self.store.add_memory(&ctx.session_id, text)?;
        info!(session_id = %ctx.session_id, "Memory saved");
        Ok("✅ Saved to memory.".to_string())
    }
}
