//! Store resolution for bucketlock.
//!
//! [`Storage`] wires one backend, one key mapper and the components built on
//! them from a [`Config`]. Every CLI command goes through it so values and
//! locks always agree on the prefix and backend.

use crate::backend::{FsBackend, MemoryBackend, ObjectBackend};
use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::keys::KeyMapper;
use crate::locks::LockManager;
use crate::values::ValueStore;
use std::sync::Arc;
use tracing::debug;

/// A configured object store with its value and lock façades.
#[derive(Debug, Clone)]
pub struct Storage {
    /// The underlying object store.
    pub backend: Arc<dyn ObjectBackend>,

    /// Key to object path mapping for this store's prefix.
    pub keys: KeyMapper,

    /// Value CRUD.
    pub values: ValueStore,

    /// Lock acquisition and inspection.
    pub locks: LockManager,
}

impl Storage {
    /// Open the backend named by `config` and build the components over it.
    ///
    /// The filesystem backend's root is created if missing; a relative root
    /// is resolved against the working directory.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let backend: Arc<dyn ObjectBackend> = match config.backend {
            BackendKind::Filesystem => Arc::new(FsBackend::open(&config.root)?),
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
        };
        debug!(backend = ?config.backend, root = %config.root, prefix = %config.prefix, "opened storage");

        Ok(Self::with_backend(backend, config))
    }

    /// Build the components over an existing backend.
    pub fn with_backend(backend: Arc<dyn ObjectBackend>, config: &Config) -> Self {
        let keys = KeyMapper::new(config.prefix.clone());
        let values = ValueStore::new(Arc::clone(&backend), keys.clone());
        let locks = LockManager::new(Arc::clone(&backend), keys.clone())
            .with_stale_threshold(config.stale_threshold())
            .with_poll_interval(config.poll_interval());

        Self {
            backend,
            keys,
            values,
            locks,
        }
    }
}
