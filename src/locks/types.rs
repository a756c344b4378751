//! Lock attempt state and lock information structures.

use crate::error::StoreError;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// Content written into every lock marker. Only its existence matters.
pub const LOCK_SENTINEL: &[u8] = b"lock";

/// Where a single acquisition attempt currently is.
#[derive(Debug)]
pub(super) enum AttemptState {
    /// Trying to create the marker.
    Trying,
    /// The marker exists; deciding whether it is stale or live.
    WaitingOnStaleCheck,
    /// The marker was created by this attempt.
    Acquired,
    /// The attempt ended with an error.
    Failed(StoreError),
}

/// Process-local bookkeeping for one call to `acquire`.
#[derive(Debug)]
pub(super) struct Attempt<'a> {
    pub key: &'a str,
    pub marker: String,
    pub started: DateTime<Utc>,
}

/// Information about a lock marker present in the store.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    /// The sanitized lock name (marker file name without `.lock`).
    pub name: String,

    /// Full object path of the marker.
    pub path: String,

    /// When the marker was last written.
    pub modified: DateTime<Utc>,

    /// Age of the marker when it was inspected.
    #[serde(serialize_with = "serialize_seconds", rename = "age_seconds")]
    pub age: Duration,

    /// Whether the marker is older than the stale threshold.
    pub is_stale: bool,
}

impl LockInfo {
    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let minutes = self.age.num_minutes();
        let hours = self.age.num_hours();
        let days = self.age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes.max(0))
        }
    }
}

impl fmt::Display for LockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (age: {}, path: {}{})",
            self.name,
            self.age_string(),
            self.path,
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}

fn serialize_seconds<S: serde::Serializer>(age: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(age.num_seconds())
}
