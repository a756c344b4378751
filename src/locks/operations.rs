//! Lock listing and clearing operations.

use super::manager::LockManager;
use super::types::LockInfo;
use crate::backend::ObjectInfo;
use crate::error::Result;
use crate::keys::LOCK_SUFFIX;
use chrono::{DateTime, Utc};
use tracing::info;

impl LockManager {
    /// List every lock marker currently in the store.
    ///
    /// Objects in the lock directory that do not end in `.lock` are skipped.
    /// The result is sorted by lock name.
    pub fn list_locks(&self) -> Result<Vec<LockInfo>> {
        let dir = format!("{}/", self.keys.lock_dir());
        let now = self.clock.now();

        let mut locks: Vec<LockInfo> = self
            .backend
            .list_prefix(&dir)?
            .into_iter()
            .filter_map(|object| {
                let name = object
                    .path
                    .strip_prefix(&dir)?
                    .strip_suffix(LOCK_SUFFIX)?
                    .to_string();
                // Markers are flat; anything nested is not ours.
                if name.contains('/') {
                    return None;
                }
                Some(self.lock_info(name, object, now))
            })
            .collect();

        locks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locks)
    }

    /// Forcefully remove the lock for `key`.
    ///
    /// Unlike [`release`](Self::release), this fails with `NotFound` when no
    /// marker exists, and reports what was removed so the caller can log it.
    /// The caller is responsible for deciding the holder is really gone.
    pub fn clear_lock(&self, key: &str) -> Result<LockInfo> {
        let marker = self.keys.lock_marker_path(key);
        let object = self.backend.stat(&marker)?;

        let name = marker
            .rsplit('/')
            .next()
            .and_then(|file| file.strip_suffix(LOCK_SUFFIX))
            .unwrap_or_default()
            .to_string();
        let info = self.lock_info(name, object, self.clock.now());

        self.backend.delete(&marker)?;
        info!(key, %marker, age = %info.age_string(), stale = info.is_stale, "lock cleared");
        Ok(info)
    }

    fn lock_info(&self, name: String, object: ObjectInfo, now: DateTime<Utc>) -> LockInfo {
        LockInfo {
            name,
            age: now.signed_duration_since(object.modified),
            is_stale: self.is_stale(object.modified, now),
            modified: object.modified,
            path: object.path,
        }
    }
}
