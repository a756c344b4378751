//! Value storage façade.
//!
//! [`ValueStore`] stores, loads, deletes, lists and stats values addressed by
//! resource key. It shares the backend and key mapper with the lock manager
//! but holds no locks itself; callers that need exclusion wrap their access in
//! [`LockManager::lock`](crate::locks::LockManager::lock).

mod store;

#[cfg(test)]
mod tests;

pub use store::{KeyInfo, ValueStore};
