//! Configuration types and defaults for bucketlock.
//!
//! This module defines enums, constants, and default value functions
//! used by the Config struct.

use crate::keys::DEFAULT_PREFIX;
use crate::locks::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_STALE_MINUTES};
use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bucketlock.yaml";

/// Which object store the CLI talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// A directory on local disk acts as the bucket (default).
    #[default]
    Filesystem,
    /// A process-local map; contents vanish on exit.
    Memory,
}

impl BackendKind {
    /// Parse a backend kind from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "filesystem" => Some(Self::Filesystem),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

pub(crate) fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

pub(crate) fn default_lock_stale_minutes() -> u32 {
    DEFAULT_STALE_MINUTES as u32
}

pub(crate) fn default_lock_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS as u64
}

pub(crate) fn default_root() -> String {
    ".bucketlock".to_string()
}
