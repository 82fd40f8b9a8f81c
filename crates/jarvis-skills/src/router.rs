//! Slash-command parsing and dispatch.

use std::sync::Arc;

use jarvis_llm::LanguageModel;
use tracing::{debug, warn};

use crate::registry::SkillRegistry;
use crate::skill::SkillContext;

/// Tokens that end the conversation.
pub const EXIT_COMMANDS: [&str; 2] = ["/exit", "/quit"];

/// Token that clears the session's conversation history.
pub const CLEAR_COMMAND: &str = "/clear";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Type /help";

/// Result of routing one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Input does not start with `/`; the caller should keep going.
    NotCommand,
    Exit,
    /// The caller should drop the session's conversation history.
    ClearHistory,
    Reply(String),
}

/// Stateless dispatcher from `/token args` to registered skills.
#[derive(Clone)]
pub struct CommandRouter {
    registry: Arc<SkillRegistry>,
}

impl CommandRouter {
    pub fn new(registry: Arc<SkillRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    /// Route `text` for `session_id`.
    ///
    /// Skill failures are rendered as reply text rather than returned as
    /// errors.
    pub async fn route(
        &self,
        text: &str,
        session_id: &str,
        llm: Arc<dyn LanguageModel>,
    ) -> CommandOutcome {
        let text = text.trim();
        if !text.starts_with('/') {
            return CommandOutcome::NotCommand;
        }

        let (token, arg) = match text.split_once(char::is_whitespace) {
            Some((token, arg)) => (token, arg.trim()),
            None => (text, ""),
        };

        if EXIT_COMMANDS.contains(&token) {
            return CommandOutcome::Exit;
        }
        if token == CLEAR_COMMAND {
            return CommandOutcome::ClearHistory;
        }

        let Some(skill) = self.registry.get(token) else {
            debug!(token, "Unknown command");
            return CommandOutcome::Reply(UNKNOWN_COMMAND.to_string());
        };

        let ctx = SkillContext {
            session_id: session_id.to_string(),
            invoked: token.to_string(),
            commands: self.registry.tokens(),
            llm,
        };

        debug!(session_id, token, "Dispatching command");
        match skill.run(arg, &ctx).await {
            Ok(reply) => CommandOutcome::Reply(reply),
            Err(e) => {
                warn!(token, error = %e, "Command failed");
                CommandOutcome::Reply(format!("❌ {} failed: {}", token, e))
            }
        }
    }
}
