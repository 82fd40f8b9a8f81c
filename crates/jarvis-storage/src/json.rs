//! JSON file backend.
//!
//! The whole file is read, mutated and rewritten on every operation. An
//! in-process lock serializes the read-modify-write and the rewrite goes
//! through a temporary file and an atomic rename, so a crash mid-write never
//! leaves a truncated document behind.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use jarvis_core::{JarvisError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{MemoryKind, MemoryStore};

/// On-disk layout: `{"memories": {session: [..]}, "notes": {session: [..]}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryFile {
    #[serde(default)]
    memories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    notes: BTreeMap<String, Vec<String>>,
}

impl MemoryFile {
    fn collection(&self, kind: MemoryKind) -> &BTreeMap<String, Vec<String>> {
        match kind {
            MemoryKind::Memories => &self.memories,
            MemoryKind::Notes => &self.notes,
        }
    }

    fn collection_mut(&mut self, kind: MemoryKind) -> &mut BTreeMap<String, Vec<String>> {
        match kind {
            MemoryKind::Memories => &mut self.memories,
            MemoryKind::Notes => &mut self.notes,
        }
    }
}

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A missing or blank file is an empty store; invalid JSON is an error.
    fn read(&self) -> Result<MemoryFile> {
        if !self.path.exists() {
            return Ok(MemoryFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(MemoryFile::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            JarvisError::Storage(format!(
                "corrupt memory file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write(&self, data: &MemoryFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Memory file written");
        Ok(())
    }
}

impl MemoryStore for JsonFileStore {
    fn append(&self, kind: MemoryKind, session_id: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let _guard = self.guard();
        let mut data = self.read()?;
        data.collection_mut(kind)
            .entry(session_id.to_string())
            .or_default()
            .push(text.to_string());
        self.write(&data)
    }

    fn list(&self, kind: MemoryKind, session_id: &str) -> Result<Vec<String>> {
        let _guard = self.guard();
        let data = self.read()?;
        Ok(data
            .collection(kind)
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    fn clear(&self, kind: MemoryKind, session_id: &str) -> Result<()> {
        let _guard = self.guard();
        let mut data = self.read()?;
        data.collection_mut(kind)
            .insert(session_id.to_string(), Vec::new());
        self.write(&data)
    }
}
