//! CRUD operations on values.

use crate::backend::ObjectBackend;
use crate::error::{Result, StoreError};
use crate::keys::{KeyMapper, normalize_prefix};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Metadata about a stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    /// The key as given by the caller.
    pub key: String,

    /// Size of the value in bytes.
    pub size: u64,

    /// Last time the value was written.
    pub modified: DateTime<Utc>,

    /// Always `true`: a flat store has no directories, so every key is a leaf.
    pub is_terminal: bool,
}

/// Key-addressed access to values in the object store.
#[derive(Debug, Clone)]
pub struct ValueStore {
    backend: Arc<dyn ObjectBackend>,
    keys: KeyMapper,
}

impl ValueStore {
    /// Create a value store over `backend`, mapping keys with `keys`.
    pub fn new(backend: Arc<dyn ObjectBackend>, keys: KeyMapper) -> Self {
        Self { backend, keys }
    }

    /// Whether a value exists for `key`.
    ///
    /// Backend failures other than absence are reported as `false`; they are
    /// logged but not returned.
    pub fn exists(&self, key: &str) -> bool {
        let path = self.keys.resource_path(key);
        match self.backend.exists(&path) {
            Ok(found) => found,
            Err(e) => {
                warn!(%path, error = %e, "existence check failed; reporting key as absent");
                false
            }
        }
    }

    /// Save `value` at `key`, replacing any previous value.
    ///
    /// Keys under the lock directory are refused with a user error.
    pub fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        self.check_writable(key)?;
        let path = self.keys.resource_path(key);
        debug!(%path, size = value.len(), "storing value");
        self.backend.put(&path, value)
    }

    /// Read the value at `key`.
    pub fn load(&self, key: &str) -> Result<Vec<u8>> {
        self.backend.get(&self.keys.resource_path(key))
    }

    /// Delete the value at `key`. Deleting a missing key succeeds.
    ///
    /// Keys under the lock directory are refused; locks are released through
    /// the lock manager.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.check_writable(key)?;
        let path = self.keys.resource_path(key);
        debug!(%path, "deleting value");
        self.backend.delete(&path)
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.keys.is_lock_path(key) {
            return Err(StoreError::UserError(format!(
                "key '{key}' maps into the lock directory '{}'",
                self.keys.lock_dir()
            )));
        }
        Ok(())
    }

    /// Keys whose path starts with `prefix`.
    ///
    /// The store has no hierarchy, so `recursive` has no effect: the result is
    /// always every key under the prefix. Objects are listed under the
    /// resolved prefix path and then filtered again against the caller's
    /// prefix, because resolving drops a trailing `/` and would let `acme/`
    /// match `acmex`. The filter prefix is normalized like a key first, so
    /// `/acme`, `./acme` and `acme` list the same keys. Returned keys are
    /// relative to the root prefix and sorted.
    pub fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<String>> {
        let resolved = self.keys.resource_path(prefix);
        let wanted = normalize_prefix(prefix);
        debug!(%resolved, recursive, "listing keys");

        let mut keys: Vec<String> = self
            .backend
            .list_prefix(&resolved)?
            .into_iter()
            .filter_map(|info| {
                self.keys
                    .key_for_path(&info.path)
                    .filter(|key| key.starts_with(wanted.as_str()))
                    .map(str::to_string)
            })
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Size and modification time of the value at `key`.
    pub fn stat(&self, key: &str) -> Result<KeyInfo> {
        let info = self.backend.stat(&self.keys.resource_path(key))?;
        Ok(KeyInfo {
            key: key.to_string(),
            size: info.size,
            modified: info.modified,
            is_terminal: true,
        })
    }

    /// The key mapper used by this store.
    pub fn keys(&self) -> &KeyMapper {
        &self.keys
    }
}
