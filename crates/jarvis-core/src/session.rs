//! Bounded per-session state.
//!
//! [`SessionMap`] holds one value per session id. Entries are created on
//! first touch, expire after an idle timeout, and the least recently touched
//! entry is evicted once the capacity is reached.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

struct Entry<T> {
    value: T,
    last_touched: Instant,
}

/// Per-session map with idle expiry and least-recently-touched eviction.
///
/// Not synchronized; owners wrap it in a `Mutex`.
pub struct SessionMap<T> {
    entries: HashMap<String, Entry<T>>,
    /// Maximum number of live sessions. `0` means unbounded.
    max_sessions: usize,
    /// Idle time after which a session is dropped. `None` disables expiry.
    idle_timeout: Option<Duration>,
}

impl<T> SessionMap<T> {
    pub fn new(max_sessions: usize, idle_timeout: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            max_sessions,
            idle_timeout,
        }
    }

    /// Unbounded map without expiry.
    pub fn unbounded() -> Self {
        Self::new(0, None)
    }

    /// Look up a session, refreshing its idle timer.
    ///
    /// Expired sessions are removed and reported as absent.
    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut T> {
        if self.is_expired(session_id) {
            self.entries.remove(session_id);
            debug!(session_id, "Session state expired");
            return None;
        }
        let entry = self.entries.get_mut(session_id)?;
        entry.last_touched = Instant::now();
        Some(&mut entry.value)
    }

    /// Look up a session without refreshing its idle timer.
    pub fn peek(&self, session_id: &str) -> Option<&T> {
        if self.is_expired(session_id) {
            return None;
        }
        self.entries.get(session_id).map(|e| &e.value)
    }

    /// Get the session's value, creating it with `init` if absent or expired.
    pub fn get_or_insert_with<F>(&mut self, session_id: &str, init: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if self.is_expired(session_id) {
            self.entries.remove(session_id);
        }

        if !self.entries.contains_key(session_id) {
            self.purge_expired();
            if self.max_sessions > 0 && self.entries.len() >= self.max_sessions {
                self.evict_oldest();
            }
        }

        let entry = self
            .entries
            .entry(session_id.to_string())
            .or_insert_with(|| Entry {
                value: init(),
                last_touched: Instant::now(),
            });
        entry.last_touched = Instant::now();
        &mut entry.value
    }

    /// Remove a session's state entirely.
    pub fn remove(&mut self, session_id: &str) -> Option<T> {
        self.entries.remove(session_id).map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every session whose idle timer has run out.
    pub fn purge_expired(&mut self) {
        let Some(timeout) = self.idle_timeout else {
            return;
        };
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.last_touched.elapsed() <= timeout);
        let purged = before - self.entries.len();
        if purged > 0 {
            debug!(purged, "Purged idle sessions");
        }
    }

    fn is_expired(&self, session_id: &str) -> bool {
        match (self.idle_timeout, self.entries.get(session_id)) {
            (Some(timeout), Some(entry)) => entry.last_touched.elapsed() > timeout,
            _ => false,
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_touched)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            debug!(session_id = %id, "Evicting least recently used session");
            self.entries.remove(&id);
        }
    }
}

impl<T> Default for SessionMap<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}
