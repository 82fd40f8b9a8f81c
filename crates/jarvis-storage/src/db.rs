//! SQLite backend.
//!
//! One row per entry keyed by collection and session. Each mutation touches
//! only its own rows, so concurrent sessions never overwrite each other.

use std::path::Path;
use std::sync::Mutex;

use jarvis_core::{JarvisError, Result};
use rusqlite::{params, Connection};
use tracing::info;

use crate::store::{MemoryKind, MemoryStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version     INTEGER PRIMARY KEY NOT NULL,
    applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);

CREATE TABLE IF NOT EXISTS memory_entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    collection  TEXT NOT NULL,
    session_id  TEXT NOT NULL,
    content     TEXT NOT NULL,
    created_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_memory_entries_session
    ON memory_entries (collection, session_id, id);

INSERT OR IGNORE INTO schema_migrations (version) VALUES (1);
";

fn storage_err(context: &str) -> impl FnOnce(rusqlite::Error) -> JarvisError + '_ {
    move |e| JarvisError::Storage(format!("{}: {}", context, e))
}

/// Memory store backed by a single SQLite connection.
///
/// The connection lives behind a `Mutex` because `rusqlite::Connection` is
/// not `Sync`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(storage_err("Failed to open database"))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(storage_err("Failed to set pragmas"))?;
        info!("Memory database opened at {}", path.display());
        Self::init(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(storage_err("Failed to open in-memory db"))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(storage_err("Failed to apply schema"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` with exclusive access to the connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JarvisError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl MemoryStore for SqliteStore {
    fn append(&self, kind: MemoryKind, session_id: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO memory_entries (collection, session_id, content) VALUES (?1, ?2, ?3)",
                params![kind.as_str(), session_id, text],
            )
            .map_err(storage_err("Failed to insert entry"))?;
            Ok(())
        })
    }

    fn list(&self, kind: MemoryKind, session_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT content FROM memory_entries
                     WHERE collection = ?1 AND session_id = ?2
                     ORDER BY id",
                )
                .map_err(storage_err("Failed to prepare query"))?;
            let rows = stmt
                .query_map(params![kind.as_str(), session_id], |row| row.get(0))
                .map_err(storage_err("Failed to query entries"))?;
            rows.collect::<std::result::Result<Vec<String>, _>>()
                .map_err(storage_err("Failed to read entry"))
        })
    }

    fn clear(&self, kind: MemoryKind, session_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM memory_entries WHERE collection = ?1 AND session_id = ?2",
                params![kind.as_str(), session_id],
            )
            .map_err(storage_err("Failed to clear entries"))?;
            Ok(())
        })
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip_order() {
        let store = SqliteStore::in_memory().unwrap();
        store.add_memory("s1", "first").unwrap();
        store.add_memory("s1", " second ").unwrap();
        assert_eq!(store.memories("s1").unwrap(), vec!["first", "second"]);
        assert!(store.memories("s2").unwrap().is_empty());
    }

    #[test]
    fn test_clear_only_affects_one_kind_and_session() {
        let store = SqliteStore::in_memory().unwrap();
        store.add_memory("s1", "fact").unwrap();
        store.add_note("s1", "note").unwrap();
        store.add_note("s2", "note2").unwrap();
        store.clear_notes("s1").unwrap();

        assert_eq!(store.memories("s1").unwrap(), vec!["fact"]);
        assert!(store.notes("s1").unwrap().is_empty());
        assert_eq!(store.notes("s2").unwrap(), vec!["note2"]);
    }

    #[test]
    fn test_file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memory.db");
        {
            let store = SqliteStore::new(&path).unwrap();
            store.add_note("s1", "remember the milk").unwrap();
        }
        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.notes("s1").unwrap(), vec!["remember the milk"]);
    }

    #[test]
    fn test_blank_text_ignored() {
        let store = SqliteStore::in_memory().unwrap();
        store.add_memory("s1", "\n\t ").unwrap();
        assert!(store.memories("s1").unwrap().is_empty());
    }
}
