use async_trait::async_trait;

use crate::error::SkillError;
use crate::skill::{Skill, SkillContext};

/// Lists every known command.
pub struct HelpSkill;

#[async_trait]
impl Skill for HelpSkill {
    fn command(&self) -> &str {
        "/help"
    }

    fn description(&self) -> &str {
        "List available commands"
    }

    async fn run(&self, _arg: &str, ctx: &SkillContext) -> Result<String, SkillError> {
        let mut commands = ctx.commands.clone();
        commands.sort();
        Ok(format!(
            "Commands:\n{}\n\n/exit - quit\n/clear - clear chat",
            commands.join("\n")
        ))
    }
}
