//! Persistent key-value storage for session tokens.
//!
//! SYSTEM CONTEXT
//! ==============
//! Plays the role browser `localStorage` played for the web client: a flat
//! string-to-string map that survives restarts. [`FileStore`] re-reads the
//! file on every access so it stays the source of truth when several
//! processes share it.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

/// Fixed key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Fixed key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Minimal synchronous string store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Returns `true` if a value was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal could not be persisted.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local store, used in tests and for one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(values.remove(key).is_some())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON object file on disk, e.g. `~/.config/threatscope/session.json`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StorageError::Io { path: self.display(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt { path: self.display(), source })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: self.display(), source })?;
            }
        }
        let raw = serde_json::to_string_pretty(map)
            .map_err(|source| StorageError::Corrupt { path: self.display(), source })?;
        std::fs::write(&self.path, raw).map_err(|source| StorageError::Io { path: self.display(), source })?;
        restrict_permissions(&self.path);
        Ok(())
    }

    /// Read-modify-write under the process-local lock. A corrupt file is
    /// replaced rather than blocking every later write.
    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!(%path, error = %source, "discarding corrupt session file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        let changed = f(&mut map);
        if changed {
            self.write_map(&map)?;
        }
        Ok(changed)
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_map() {
            Ok(mut map) => map.remove(key),
            Err(e) => {
                tracing::warn!(error = %e, "session file unreadable; treating as empty");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.insert(key.to_owned(), value.to_owned());
            true
        })
        .map(|_| ())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.update(|map| map.remove(key).is_some())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        tracing::debug!(error = %e, "could not restrict session file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
