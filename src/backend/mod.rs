//! Object store backend abstraction.
//!
//! [`ObjectBackend`] is the only surface the lock manager and value store
//! touch. It models a flat, last-write-wins object store: there is no
//! hierarchy, no transaction, and in general no conditional write.
//!
//! # Implementations
//!
//! | Backend | Conditional put | Notes |
//! |---------|-----------------|-------|
//! | [`MemoryBackend`] | no | Testing; timestamps come from an injected clock |
//! | [`FsBackend`] | yes (`create_new`) | One directory is one bucket |

mod fs;
mod memory;

pub use fs::FsBackend;
pub use memory::MemoryBackend;

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata for one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Full object path, including the root prefix.
    pub path: String,

    /// Size of the object in bytes.
    pub size: u64,

    /// Last time the object was written.
    pub modified: DateTime<Utc>,
}

/// The primitive operations of a flat object store.
///
/// Each call is synchronous and atomic for a single object. Implementations
/// must be thread-safe; one backend is shared by every lock and value
/// operation in a process.
pub trait ObjectBackend: Send + Sync + std::fmt::Debug {
    /// Whether an object exists at `path`. Absence is `Ok(false)`, not an error.
    fn exists(&self, path: &str) -> Result<bool>;

    /// Read the full object.
    ///
    /// Returns [`StoreError::NotFound`](crate::error::StoreError::NotFound) when absent.
    fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Write the full object, replacing any existing content.
    fn put(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Delete the object. Deleting an absent object succeeds.
    fn delete(&self, path: &str) -> Result<()>;

    /// Every object whose path starts with `prefix`.
    ///
    /// Listings may be eventually consistent; the order is unspecified.
    fn list_prefix(&self, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Read the metadata of one object.
    ///
    /// Returns [`StoreError::NotFound`](crate::error::StoreError::NotFound) when absent.
    fn stat(&self, path: &str) -> Result<ObjectInfo>;

    /// Create the object only if nothing exists at `path`.
    ///
    /// Backends with a native create-if-absent return `Some`, with
    /// [`StoreError::AlreadyLocked`](crate::error::StoreError::AlreadyLocked)
    /// when the object exists. The default returns `None`, and callers fall
    /// back to `exists` followed by `put`.
    fn put_if_absent(&self, _path: &str, _data: &[u8]) -> Option<Result<()>> {
        None
    }
}
