//! Slash-command skills for Jarvis.
//!
//! A [`Skill`] declares a primary command token, optional aliases and an async
//! `run`. The [`SkillRegistry`] maps every token to its skill and the
//! [`CommandRouter`] parses `/command args` input and dispatches it.

pub mod builtin;
pub mod error;
pub mod registry;
pub mod router;
pub mod skill;

pub use builtin::{builtin_skills, BuiltinDeps};
pub use error::SkillError;
pub use registry::{is_valid_token, SkillRegistry};
pub use router::{CommandOutcome, CommandRouter, CLEAR_COMMAND, EXIT_COMMANDS, UNKNOWN_COMMAND};
pub use skill::{Skill, SkillContext};
