//! Persisted per-session memory facts and notes.
//!
//! Two backends implement [`MemoryStore`]: a single JSON document
//! ([`JsonFileStore`]) and an embedded SQLite database ([`SqliteStore`]).

pub mod db;
pub mod json;
pub mod store;

pub use db::SqliteStore;
pub use json::JsonFileStore;
pub use store::{open_store, MemoryKind, MemoryStore};
