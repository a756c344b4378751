//! The acquire/release protocol.
//!
//! A lock is held while its marker object exists. Acquisition polls:
//!
//! ```text
//!            ┌──────── not found / stale (marker deleted) ───────┐
//!            v                                                   │
//!        Trying ── already exists ──> WaitingOnStaleCheck ───────┤
//!          │                               │                     │
//!       created                     fresh, in budget:            │
//!          v                        sleep poll interval ─────────┘
//!      Acquired                            │
//!                                  backend error, cancelled,
//!                                  or waited > 2 × stale ──> Failed
//! ```
//!
//! Without a conditional put, creating the marker is exists-then-put, so two
//! processes can both observe absence and both write. The lock reduces
//! stampedes and recovers from crashed holders; it is not a linearizable
//! mutex.

use super::guard::LockGuard;
use super::types::{Attempt, AttemptState, LOCK_SENTINEL};
use crate::backend::ObjectBackend;
use crate::cancel::CancelToken;
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};
use crate::keys::KeyMapper;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default age, in minutes, after which a marker is presumed abandoned.
pub const DEFAULT_STALE_MINUTES: i64 = 120;

/// Default wait, in milliseconds, between acquisition attempts.
pub const DEFAULT_POLL_INTERVAL_MS: i64 = 1000;

/// Acquires and releases locks backed by marker objects.
#[derive(Debug, Clone)]
pub struct LockManager {
    pub(super) backend: Arc<dyn ObjectBackend>,
    pub(super) keys: KeyMapper,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) stale_threshold: Duration,
    pub(super) poll_interval: Duration,
}

impl LockManager {
    /// Create a lock manager with the default stale threshold and poll interval.
    pub fn new(backend: Arc<dyn ObjectBackend>, keys: KeyMapper) -> Self {
        Self {
            backend,
            keys,
            clock: Arc::new(SystemClock),
            stale_threshold: Duration::minutes(DEFAULT_STALE_MINUTES),
            poll_interval: Duration::milliseconds(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Use `clock` for marker ages, the wait budget and poll sleeps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the age after which markers are reclaimed.
    pub fn with_stale_threshold(mut self, threshold: Duration) -> Self {
        self.stale_threshold = threshold;
        self
    }

    /// Set the wait between acquisition attempts.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The configured stale threshold.
    pub fn stale_threshold(&self) -> Duration {
        self.stale_threshold
    }

    /// The configured poll interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Block until the lock for `key` is obtained.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - This caller created the marker
    /// * `Err(StoreError::Cancelled)` - `cancel` fired while waiting
    /// * `Err(StoreError::DeadlockSuspected)` - a live marker blocked us for
    ///   more than twice the stale threshold
    /// * `Err(StoreError::Io)` - the backend failed; never retried
    ///
    /// A marker written before cancellation is left in place and will be
    /// reclaimed once it goes stale.
    pub fn acquire(&self, cancel: &CancelToken, key: &str) -> Result<()> {
        let attempt = Attempt {
            key,
            marker: self.keys.lock_marker_path(key),
            started: self.clock.now(),
        };

        let mut state = AttemptState::Trying;
        loop {
            debug!(key, marker = %attempt.marker, ?state, "lock attempt");
            state = match state {
                AttemptState::Trying => self.try_create(cancel, &attempt),
                AttemptState::WaitingOnStaleCheck => self.check_marker(cancel, &attempt),
                AttemptState::Acquired => {
                    info!(key, marker = %attempt.marker, "lock acquired");
                    return Ok(());
                }
                AttemptState::Failed(err) => return Err(err),
            };
        }
    }

    /// Acquire the lock and return a guard that releases it when dropped.
    pub fn lock(&self, cancel: &CancelToken, key: &str) -> Result<LockGuard> {
        self.acquire(cancel, key)?;
        Ok(LockGuard::new(
            Arc::clone(&self.backend),
            key.to_string(),
            self.keys.lock_marker_path(key),
        ))
    }

    /// Make a single attempt to create the marker, without waiting.
    ///
    /// Returns `Ok(false)` if a marker already exists, stale or not.
    pub fn try_acquire(&self, key: &str) -> Result<bool> {
        let marker = self.keys.lock_marker_path(key);
        match self.create_marker(&marker) {
            Ok(()) => {
                info!(key, %marker, "lock acquired");
                Ok(true)
            }
            Err(StoreError::AlreadyLocked { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Release the lock for `key`.
    ///
    /// Deletes the marker unconditionally; releasing a lock that is not held,
    /// or was already reclaimed by another process, succeeds.
    pub fn release(&self, key: &str) -> Result<()> {
        let marker = self.keys.lock_marker_path(key);
        self.backend.delete(&marker)?;
        info!(key, %marker, "lock released");
        Ok(())
    }

    fn try_create(&self, cancel: &CancelToken, attempt: &Attempt<'_>) -> AttemptState {
        if cancel.is_cancelled() {
            return cancelled(attempt);
        }
        match self.create_marker(&attempt.marker) {
            Ok(()) => AttemptState::Acquired,
            Err(StoreError::AlreadyLocked { .. }) => AttemptState::WaitingOnStaleCheck,
            Err(e) => {
                warn!(key = attempt.key, error = %e, "creating lock marker failed");
                AttemptState::Failed(e)
            }
        }
    }

    fn check_marker(&self, cancel: &CancelToken, attempt: &Attempt<'_>) -> AttemptState {
        let info = match self.backend.stat(&attempt.marker) {
            Ok(info) => info,
            // Removed between our create attempt and the stat.
            Err(e) if e.is_not_found() => return AttemptState::Trying,
            Err(e) => {
                warn!(key = attempt.key, error = %e, "reading lock marker failed");
                return AttemptState::Failed(e);
            }
        };

        let now = self.clock.now();
        if self.is_stale(info.modified, now) {
            info!(
                key = attempt.key,
                marker = %attempt.marker,
                modified = %info.modified,
                "lock is stale; removing then retrying"
            );
            // Another waiter may be deleting it too.
            if let Err(e) = self.backend.delete(&attempt.marker) {
                warn!(key = attempt.key, error = %e, "removing stale lock marker failed");
            }
            return AttemptState::Trying;
        }

        let waited = now.signed_duration_since(attempt.started);
        if waited > self.stale_threshold * 2 {
            return AttemptState::Failed(StoreError::DeadlockSuspected {
                key: attempt.key.to_string(),
                waited,
            });
        }

        if cancel.is_cancelled() {
            return cancelled(attempt);
        }
        self.clock.sleep(self.poll_interval, cancel);
        if cancel.is_cancelled() {
            return cancelled(attempt);
        }
        AttemptState::Trying
    }

    /// Create the marker if none exists.
    ///
    /// Uses the backend's conditional put when it has one; otherwise checks
    /// for existence and then writes, which is racy.
    fn create_marker(&self, marker: &str) -> Result<()> {
        if let Some(result) = self.backend.put_if_absent(marker, LOCK_SENTINEL) {
            return result;
        }
        if self.backend.exists(marker)? {
            return Err(StoreError::AlreadyLocked {
                path: marker.to_string(),
            });
        }
        self.backend.put(marker, LOCK_SENTINEL)
    }

    pub(super) fn is_stale(&self, modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(modified) > self.stale_threshold
    }
}

fn cancelled(attempt: &Attempt<'_>) -> AttemptState {
    debug!(key = attempt.key, "lock attempt cancelled");
    AttemptState::Failed(StoreError::Cancelled {
        key: attempt.key.to_string(),
    })
}
