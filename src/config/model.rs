//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a bucketlock store.
///
/// This struct represents the contents of `bucketlock.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Layout settings
    // =========================================================================
    /// Root prefix under which all objects are stored (default: "certmagic").
    #[serde(default = "default_prefix")]
    pub prefix: String,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Minutes after which a lock marker is considered stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    /// Milliseconds to wait between lock acquisition attempts.
    #[serde(default = "default_lock_poll_interval_ms")]
    pub lock_poll_interval_ms: u64,

    // =========================================================================
    // Backend settings
    // =========================================================================
    /// Object store implementation.
    #[serde(default)]
    pub backend: BackendKind,

    /// Directory used as the bucket by the filesystem backend.
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            lock_stale_minutes: default_lock_stale_minutes(),
            lock_poll_interval_ms: default_lock_poll_interval_ms(),
            backend: BackendKind::default(),
            root: default_root(),
        }
    }
}
