//! Filesystem utilities for bucketlock.
//!
//! Atomic and exclusive writes used by the filesystem object backend.

pub mod atomic;

pub use atomic::{atomic_write, create_exclusive, is_temp_file};
