//! Local match history.
//!
//! The history is a short list of finished matches, newest first, capped at
//! [`HISTORY_LIMIT`]. Stores never fail towards the caller: anything that
//! cannot be read is treated as an empty history, and write failures are
//! logged and swallowed.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::{MatchHistoryEntry, HISTORY_LIMIT};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Persistence seam for finished matches
pub trait HistoryStore: Send + Sync {
    /// Stored entries, newest first. Possibly empty, never fails.
    fn load(&self) -> Vec<MatchHistoryEntry>;

    /// Replace the stored entries. The caller has already ordered and truncated them.
    fn save(&self, entries: &[MatchHistoryEntry]);
}

/// Prepend `entry`, keep the newest [`HISTORY_LIMIT`] entries, persist and return them
pub fn record_match(store: &dyn HistoryStore, entry: MatchHistoryEntry) -> Vec<MatchHistoryEntry> {
    let mut entries = store.load();
    entries.insert(0, entry);
    entries.truncate(HISTORY_LIMIT);
    store.save(&entries);
    entries
}

/// History kept in a JSON file on disk
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<MatchHistoryEntry>, HistoryError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, entries: &[MatchHistoryEntry]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load(&self) -> Vec<MatchHistoryEntry> {
        match self.read() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Could not load match history from {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[MatchHistoryEntry]) {
        if let Err(e) = self.write(entries) {
            tracing::warn!(
                "Could not save match history to {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// History kept in memory only
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<MatchHistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<MatchHistoryEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Vec<MatchHistoryEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, entries: &[MatchHistoryEntry]) {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = entries.to_vec();
    }
}
