//! Built-in skills, registered from a static list.

pub mod calc;
pub mod document;
pub mod help;
pub mod notes;
pub mod recall;
pub mod remember;
pub mod time;

use std::sync::Arc;

use jarvis_docs::DocumentQa;
use jarvis_storage::MemoryStore;

use crate::skill::Skill;

pub use calc::CalcSkill;
pub use document::DocumentSkill;
pub use help::HelpSkill;
pub use notes::NotesSkill;
pub use recall::RecallSkill;
pub use remember::RememberSkill;
pub use time::TimeSkill;

/// Collaborators the built-in skills need.
#[derive(Clone)]
pub struct BuiltinDeps {
    pub memory: Arc<dyn MemoryStore>,
    pub documents: DocumentQa,
    pub timezone: chrono_tz::Tz,
    /// Chunks retrieved for `/pdf` questions.
    pub document_top_k: usize,
}

/// Built-in skills in registration order. Later entries win token collisions.
pub fn builtin_skills(deps: &BuiltinDeps) -> Vec<Arc<dyn Skill>> {
    vec![
        Arc::new(HelpSkill),
        Arc::new(CalcSkill),
        Arc::new(TimeSkill::new(deps.timezone)),
        Arc::new(RememberSkill::new(Arc::clone(&deps.memory))),
        Arc::new(RecallSkill::new(Arc::clone(&deps.memory))),
        Arc::new(NotesSkill::new(Arc::clone(&deps.memory))),
        Arc::new(DocumentSkill::new(deps.documents.clone(), deps.document_top_k)),
    ]
}
