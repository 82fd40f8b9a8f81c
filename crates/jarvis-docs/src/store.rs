//! Per-session document store.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use jarvis_core::SessionMap;

/// One chunk of an indexed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub source_id: String,
    pub text: String,
}

#[derive(Debug, Default)]
struct SessionDocuments {
    active: Option<String>,
    chunks: Vec<Chunk>,
}

/// In-memory holder of each session's active document and its chunks.
///
/// A session holds chunks for one source at a time; storing a new document
/// replaces the previous chunk set.
pub struct DocumentStore {
    sessions: Mutex<SessionMap<SessionDocuments>>,
}

impl DocumentStore {
    pub fn new(max_sessions: usize, idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(SessionMap::new(max_sessions, idle_timeout)),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0, None)
    }

    /// Mark `source_id` as the session's active document.
    pub fn set_active(&self, session_id: &str, source_id: &str) {
        let mut sessions = self.lock();
        sessions
            .get_or_insert_with(session_id, SessionDocuments::default)
            .active = Some(source_id.to_string());
    }

    /// The session's active document, if any.
    pub fn active(&self, session_id: &str) -> Option<String> {
        self.lock()
            .peek(session_id)
            .and_then(|docs| docs.active.clone())
    }

    /// Replace the session's chunk set with `chunks` from `source_id` and make
    /// it the active document.
    pub fn replace(&self, session_id: &str, source_id: &str, chunks: Vec<String>) {
        let mut sessions = self.lock();
        let docs = sessions.get_or_insert_with(session_id, SessionDocuments::default);
        docs.chunks = chunks
            .into_iter()
            .map(|text| Chunk {
                source_id: source_id.to_string(),
                text,
            })
            .collect();
        docs.active = Some(source_id.to_string());
    }

    /// Chunk texts of `source_id`, or of the active document when `None`.
    pub fn chunks_for(&self, session_id: &str, source_id: Option<&str>) -> Vec<String> {
        let mut sessions = self.lock();
        let Some(docs) = sessions.get_mut(session_id) else {
            return Vec::new();
        };
        let Some(source) = source_id.map(str::to_string).or_else(|| docs.active.clone()) else {
            return Vec::new();
        };
        docs.chunks
            .iter()
            .filter(|c| c.source_id == source)
            .map(|c| c.text.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, SessionMap<SessionDocuments>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::unbounded()
    }
}
