//! RAII lock guard implementation.

use crate::backend::ObjectBackend;
use crate::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// RAII guard for a held lock.
///
/// When dropped, the marker is deleted. If deletion fails, a warning is
/// logged but no panic occurs; the marker then ages out and is reclaimed.
#[derive(Debug)]
pub struct LockGuard {
    backend: Arc<dyn ObjectBackend>,

    /// The key the lock was taken for.
    key: String,

    /// Object path of the marker.
    marker: String,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    pub(super) fn new(backend: Arc<dyn ObjectBackend>, key: String, marker: String) -> Self {
        Self {
            backend,
            key,
            marker,
            released: false,
        }
    }

    /// The key this guard protects.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Object path of the marker.
    pub fn marker_path(&self) -> &str {
        &self.marker
    }

    /// Manually release the lock.
    ///
    /// Use this instead of dropping the guard to handle release errors.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.backend.delete(&self.marker)?;
        info!(key = %self.key, marker = %self.marker, "lock released");
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.backend.delete(&self.marker) {
            Ok(()) => info!(key = %self.key, marker = %self.marker, "lock released"),
            Err(e) => warn!(
                key = %self.key,
                marker = %self.marker,
                error = %e,
                "failed to release lock"
            ),
        }
    }
}
