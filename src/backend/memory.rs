//! In-memory object backend.
//!
//! Objects live in a [`BTreeMap`] behind a [`parking_lot::RwLock`]. Clones
//! share the same data, so one `MemoryBackend` can stand in for a bucket
//! shared by several simulated processes.
//!
//! Like a plain object store it has no conditional put; lock creation on top
//! of it goes through the exists-then-put path.

use super::{ObjectBackend, ObjectInfo};
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    modified: DateTime<Utc>,
}

/// In-memory, clock-driven object backend.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    clock: Arc<dyn Clock>,
    outage: Arc<AtomicBool>,
}

impl MemoryBackend {
    /// Create an empty backend stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty backend stamped by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            clock,
            outage: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Overwrite the last-modified time of an existing object.
    ///
    /// Returns `false` if no object exists at `path`.
    pub fn set_modified(&self, path: &str, modified: DateTime<Utc>) -> bool {
        match self.objects.write().get_mut(path) {
            Some(object) => {
                object.modified = modified;
                true
            }
            None => false,
        }
    }

    /// Make every operation fail with an I/O error until turned off again.
    pub fn set_outage(&self, failing: bool) {
        self.outage.store(failing, Ordering::SeqCst);
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the backend holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    fn check_available(&self, op: &str, path: &str) -> Result<()> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(StoreError::io(format!(
                "{op} '{path}': backend unavailable"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectBackend for MemoryBackend {
    fn exists(&self, path: &str) -> Result<bool> {
        self.check_available("exists", path)?;
        Ok(self.objects.read().contains_key(path))
    }

    fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.check_available("get", path)?;
        self.objects
            .read()
            .get(path)
            .map(|object| object.data.clone())
            .ok_or_else(|| StoreError::not_found(path))
    }

    fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        self.check_available("put", path)?;
        let object = StoredObject {
            data: data.to_vec(),
            modified: self.clock.now(),
        };
        self.objects.write().insert(path.to_string(), object);
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.check_available("delete", path)?;
        self.objects.write().remove(path);
        Ok(())
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        self.check_available("list", prefix)?;
        let objects = self.objects.read();
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, object)| info(path, object))
            .collect())
    }

    fn stat(&self, path: &str) -> Result<ObjectInfo> {
        self.check_available("stat", path)?;
        self.objects
            .read()
            .get(path)
            .map(|object| info(path, object))
            .ok_or_else(|| StoreError::not_found(path))
    }
}

fn info(path: &str, object: &StoredObject) -> ObjectInfo {
    ObjectInfo {
        path: path.to_string(),
        size: object.data.len() as u64,
        modified: object.modified,
    }
}
