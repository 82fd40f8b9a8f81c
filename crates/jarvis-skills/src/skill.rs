//! The skill trait and its invocation context.

use std::sync::Arc;

use async_trait::async_trait;
use jarvis_llm::LanguageModel;

use crate::error::SkillError;

/// Everything a skill receives besides its argument text.
#[derive(Clone)]
pub struct SkillContext {
    pub session_id: String,
    /// The exact token used, so one skill can branch on its aliases.
    pub invoked: String,
    /// Every registered token, for help listings.
    pub commands: Vec<String>,
    pub llm: Arc<dyn LanguageModel>,
}

impl std::fmt::Debug for SkillContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillContext")
            .field("session_id", &self.session_id)
            .field("invoked", &self.invoked)
            .field("commands", &self.commands)
            .field("llm", &self.llm.model_name())
            .finish()
    }
}

/// A handler for one or more slash-command tokens.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Primary token, including the leading `/`.
    fn command(&self) -> &str;

    /// Additional tokens routed to the same skill.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for listings.
    fn description(&self) -> &str;

    /// Handle `arg` (the text after the token, trimmed).
    async fn run(&self, arg: &str, ctx: &SkillContext) -> Result<String, SkillError>;
}
