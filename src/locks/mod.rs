//! Locking subsystem for bucketlock.
//!
//! A lock on a key is a marker object at `<prefix>/locks/<sanitized key>.lock`.
//! Whoever creates the marker holds the lock; releasing deletes it.
//!
//! # Lock Markers
//!
//! Markers hold the fixed bytes `lock`. There is no owner, generation or
//! heartbeat: the marker's last-modified time is the only signal of its age.
//! A marker older than the stale threshold (default 2 hours) is presumed
//! abandoned by a crashed holder and any waiter may delete it.
//!
//! # Guarantees
//!
//! Mutual exclusion is best effort. Object stores without a conditional put
//! force an exists-then-put race, so two processes can briefly both believe
//! they hold a lock, and a holder that runs past the stale threshold can have
//! its marker reclaimed. Backends that do offer create-if-absent (see
//! [`ObjectBackend::put_if_absent`](crate::backend::ObjectBackend::put_if_absent))
//! close the first gap.
//!
//! # RAII Guards
//!
//! [`LockManager::lock`] returns a [`LockGuard`] that releases the lock when
//! dropped. If deletion fails during drop, a warning is logged but the
//! program does not crash.

mod guard;
mod manager;
mod operations;
mod types;


// Re-export public API
pub use guard::LockGuard;
pub use manager::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_STALE_MINUTES, LockManager};
pub use types::{LOCK_SENTINEL, LockInfo};
