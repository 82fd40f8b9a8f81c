//! Volatile per-session conversation history.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use jarvis_core::{ChatMessage, SessionMap};

/// Conversation turns per session, capped at `max_messages` (oldest dropped).
///
/// Whole turns are dropped, so an odd cap keeps one message less than the
/// cap and history always starts with a user message.
pub struct HistoryStore {
    sessions: Mutex<SessionMap<Vec<ChatMessage>>>,
    max_messages: usize,
}

impl HistoryStore {
    pub fn new(max_sessions: usize, idle_timeout: Option<Duration>, max_messages: usize) -> Self {
        Self {
            sessions: Mutex::new(SessionMap::new(max_sessions, idle_timeout)),
            max_messages,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0, None, 0)
    }

    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.lock()
            .get_mut(session_id)
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Append a user message and the assistant's reply.
    pub fn append_turn(&self, session_id: &str, user: &str, assistant: &str) {
        let mut sessions = self.lock();
        let history = sessions.get_or_insert_with(session_id, Vec::new);
        history.push(ChatMessage::user(user));
        history.push(ChatMessage::assistant(assistant));
        if self.max_messages > 0 && history.len() > self.max_messages {
            let excess = history.len() - self.max_messages;
            history.drain(..excess + excess % 2);
        }
    }

    pub fn clear(&self, session_id: &str) {
        self.lock().remove(session_id);
    }

    fn lock(&self) -> MutexGuard<'_, SessionMap<Vec<ChatMessage>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
