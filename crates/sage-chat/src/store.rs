//! Append-only message store with best-effort snapshot persistence.
//!
//! The store exclusively owns the ordered conversation log; the UI reads a
//! read-only view. After every append the full sequence is serialized and
//! overwritten into a key-value snapshot so a reload can restore the prior
//! conversation. Persistence is best-effort: write failures are logged and
//! ignored, a missing or corrupt snapshot is silently discarded.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use sage_core::types::Message;

use crate::error::ChatError;

// =============================================================================
// SnapshotStore
// =============================================================================

/// Local key-value string store (the browser-storage collaborator).
///
/// No cross-instance coordination, no locking beyond the process: last
/// writer wins.
pub trait SnapshotStore: Send + Sync {
    /// Read the value for a key, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite the value for a key.
    fn put(&self, key: &str, value: &str) -> Result<(), ChatError>;
}

/// In-memory snapshot store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), ChatError> {
        let mut map = self
            .entries
            .lock()
            .map_err(|e| ChatError::Storage(format!("snapshot lock poisoned: {}", e)))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed snapshot store: one JSON file per key under a data directory.
#[derive(Debug)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ChatError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| ChatError::Storage(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), ChatError> {
        std::fs::write(self.path_for(key), value).map_err(|e| ChatError::Storage(e.to_string()))
    }
}

// =============================================================================
// MessageStore
// =============================================================================

/// Ordered, append-only log of exchanged messages.
pub struct MessageStore {
    messages: Vec<Message>,
    snapshot: Box<dyn SnapshotStore>,
    key: String,
}

impl MessageStore {
    /// Open the store, restoring any prior conversation from the snapshot.
    ///
    /// A missing or unparsable snapshot is discarded without error.
    pub fn open(snapshot: Box<dyn SnapshotStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let messages = match snapshot.get(&key) {
            Some(raw) => match serde_json::from_str::<Vec<Message>>(&raw) {
                Ok(messages) => {
                    tracing::debug!(count = messages.len(), "Conversation restored from snapshot");
                    messages
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Corrupt conversation snapshot discarded");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self {
            messages,
            snapshot,
            key,
        }
    }

    /// Append a message and persist the full sequence (best-effort).
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.persist();
    }

    /// Read-only view of the ordered sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Serialize and overwrite the snapshot. Failures are logged and ignored.
    fn persist(&self) {
        let raw = match serde_json::to_string(&self.messages) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize conversation snapshot");
                return;
            }
        };
        if let Err(e) = self.snapshot.put(&self.key, &raw) {
            tracing::warn!(error = %e, "Failed to write conversation snapshot");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
