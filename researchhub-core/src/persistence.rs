//! Durable key-value storage and the typed bridge used by the session.
//!
//! Every value is stored as JSON inside a versioned envelope
//! (`{"version": 1, "updatedAt": ..., "items": ...}`). Bare unversioned
//! values written by earlier clients are still accepted on load and are
//! rewritten in the envelope form on the next save. A value that cannot be
//! read (corrupt, or written by a newer schema) is copied to a backup key
//! before the session starts over, so the next save never destroys it.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Store key for the recent-search history.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Store key for the saved-paper collection.
pub const SAVED_PAPERS_KEY: &str = "savedPapers";

/// Current schema version written into every envelope.
pub const SCHEMA_VERSION: u32 = 1;

/// A durable string key-value store.
///
/// Each `set` replaces the whole value for a key; there are no partial
/// updates.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed store: one `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Io {
                key: key.to_string(),
                message: format!("Failed to read {}: {}", path.display(), e),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        tracing::debug!(key, path = %path.display(), "Writing store entry");
        atomic_write(&path, value.as_bytes()).map_err(|e| StorageError::Io {
            key: key.to_string(),
            message: format!("Failed to write {}: {}", path.display(), e),
        })
    }
}

/// In-process store; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, e.g. to simulate data left by an earlier session.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.lock().insert(key.to_string(), value.to_string());
        self
    }

    /// The raw stored string for a key.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Replace the contents of `path` so readers see the old or the new bytes,
/// never a partial file. The store directory is created on first use.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let Some(dir) = path.parent() else {
        return std::fs::write(path, data);
    };
    std::fs::create_dir_all(dir)?;
    let staging = path.with_extension("tmp");
    std::fs::write(&staging, data)?;
    std::fs::rename(&staging, path)
}

/// Key under which an unreadable value for `key` is preserved.
pub fn backup_key(key: &str, error: &StorageError) -> String {
    match error {
        StorageError::UnsupportedVersion { found, .. } => format!("{}.v{}.bak", key, found),
        _ => format!("{}.bak", key),
    }
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    version: u32,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
    items: &'a T,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    version: u32,
    items: serde_json::Value,
}

/// Serialize `value` into the current envelope format.
pub fn encode_versioned<T: Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    let envelope = EnvelopeOut {
        version: SCHEMA_VERSION,
        updated_at: Utc::now(),
        items: value,
    };
    serde_json::to_string_pretty(&envelope).map_err(|e| StorageError::Serialize {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Parse a stored value, accepting the envelope or a legacy bare value.
pub fn decode_versioned<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StorageError> {
    let malformed = |e: serde_json::Error| StorageError::Malformed {
        key: key.to_string(),
        message: e.to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(raw).map_err(malformed)?;
    let is_envelope = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("version"));

    if !is_envelope {
        // Unversioned layout: the value itself.
        return serde_json::from_value(value).map_err(malformed);
    }

    let envelope: EnvelopeIn = serde_json::from_value(value).map_err(malformed)?;
    if envelope.version > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedVersion {
            key: key.to_string(),
            found: envelope.version,
        });
    }
    serde_json::from_value(envelope.items).map_err(malformed)
}

/// Typed load/save adapter over a [`KeyValueStore`].
#[derive(Clone)]
pub struct PersistenceBridge {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for PersistenceBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceBridge").finish_non_exhaustive()
    }
}

impl PersistenceBridge {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A bridge over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// A bridge over a [`FileStore`] rooted at `dir`.
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(dir)))
    }

    /// Load a value. `Ok(None)` when the key has never been written.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.store.get(key)? {
            Some(raw) => decode_versioned(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Load a value, falling back to `T::default()` on absence or any error.
    ///
    /// A stored value that exists but cannot be decoded is first copied,
    /// untouched, to [`backup_key`].
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Could not read stored value");
                return T::default();
            }
        };

        match decode_versioned(key, &raw) {
            Ok(value) => value,
            Err(e) => {
                let backup = backup_key(key, &e);
                match self.store.set(&backup, &raw) {
                    Ok(()) => tracing::warn!(
                        key,
                        backup = %backup,
                        error = %e,
                        "Unreadable stored value moved aside; starting empty"
                    ),
                    Err(write_err) => tracing::warn!(
                        key,
                        error = %e,
                        backup_error = %write_err,
                        "Unreadable stored value could not be backed up; starting empty"
                    ),
                }
                T::default()
            }
        }
    }

    /// Replace the stored value for `key` in a single write.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = encode_versioned(key, value)?;
        self.store.set(key, &encoded)
    }
}
