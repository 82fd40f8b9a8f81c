//! The memory store trait and backend selection.

use std::path::Path;
use std::sync::Arc;

use jarvis_core::config::MemoryConfig;
use jarvis_core::{JarvisError, Result};
use tracing::info;

use crate::db::SqliteStore;
use crate::json::JsonFileStore;

/// The two per-session collections a store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryKind {
    /// Facts about the user, injected into conversations.
    Memories,
    /// Free-form notes managed with `/notes`.
    Notes,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Memories => "memories",
            MemoryKind::Notes => "notes",
        }
    }
}

/// Durable, append-only lists of text per session.
///
/// Stored text is trimmed; blank text is ignored.
pub trait MemoryStore: Send + Sync {
    fn append(&self, kind: MemoryKind, session_id: &str, text: &str) -> Result<()>;

    /// Entries in insertion order. Unknown sessions yield an empty list.
    fn list(&self, kind: MemoryKind, session_id: &str) -> Result<Vec<String>>;

    fn clear(&self, kind: MemoryKind, session_id: &str) -> Result<()>;

    fn add_memory(&self, session_id: &str, text: &str) -> Result<()> {
        self.append(MemoryKind::Memories, session_id, text)
    }

    fn memories(&self, session_id: &str) -> Result<Vec<String>> {
        self.list(MemoryKind::Memories, session_id)
    }

    fn clear_memories(&self, session_id: &str) -> Result<()> {
        self.clear(MemoryKind::Memories, session_id)
    }

    fn add_note(&self, session_id: &str, text: &str) -> Result<()> {
        self.append(MemoryKind::Notes, session_id, text)
    }

    fn notes(&self, session_id: &str) -> Result<Vec<String>> {
        self.list(MemoryKind::Notes, session_id)
    }

    fn clear_notes(&self, session_id: &str) -> Result<()> {
        self.clear(MemoryKind::Notes, session_id)
    }
}

/// Open the backend named in `config` inside `data_dir`.
pub fn open_store(config: &MemoryConfig, data_dir: &Path) -> Result<Arc<dyn MemoryStore>> {
    let path = data_dir.join(&config.file_name);
    let store: Arc<dyn MemoryStore> = match config.backend.as_str() {
        "json" => Arc::new(JsonFileStore::new(path)),
        "sqlite" => Arc::new(SqliteStore::new(&path)?),
        other => {
            return Err(JarvisError::Config(format!(
                "unknown memory backend '{}'",
                other
            )))
        }
    };
    info!(backend = %config.backend, "Memory store opened");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_store_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&MemoryConfig::default(), dir.path()).unwrap();
        store.add_memory("s1", "likes tea").unwrap();
        assert!(dir.path().join("memory.json").exists());
    }

    #[test]
    fn test_open_store_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemoryConfig {
            backend: "sqlite".to_string(),
            file_name: "memory.db".to_string(),
        };
        let store = open_store(&config, dir.path()).unwrap();
        store.add_note("s1", "buy milk").unwrap();
        assert_eq!(store.notes("s1").unwrap(), vec!["buy milk"]);
    }

    #[test]
    fn test_open_store_unknown_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemoryConfig {
            backend: "redis".to_string(),
            ..MemoryConfig::default()
        };
        assert!(matches!(
            open_store(&config, dir.path()),
            Err(JarvisError::Config(_))
        ));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(MemoryKind::Memories.as_str(), "memories");
        assert_eq!(MemoryKind::Notes.as_str(), "notes");
    }
}
