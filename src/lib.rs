//! Bucketlock: best-effort locking and value storage over a flat object store.
//!
//! Values are addressed by key and stored at `<prefix>/<key>`. A lock on a
//! key is a marker object whose existence means "held"; waiters poll, reclaim
//! markers older than the stale threshold, and give up when a live marker
//! blocks them for twice that long.
//!
//! [`storage::Storage`] wires a backend, a [`keys::KeyMapper`], a
//! [`values::ValueStore`] and a [`locks::LockManager`] from a
//! [`config::Config`].

pub mod backend;
pub mod cancel;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod keys;
pub mod locks;
pub mod storage;
pub mod values;

#[cfg(test)]
pub(crate) mod test_support;
