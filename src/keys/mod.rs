//! Key-to-path mapping.
//!
//! Every object bucketlock touches lives under one root prefix:
//!
//! - Values: `<prefix>/<normalized key>`
//! - Lock markers: `<prefix>/locks/<sanitized key>.lock`
//!
//! Value keys that normalize into `locks/` would share paths with markers.
//! [`KeyMapper::is_lock_path`] detects them and the value store refuses to
//! write or delete them. Reads are allowed.

mod mapper;
mod sanitize;

pub use mapper::{DEFAULT_PREFIX, KeyMapper, LOCK_SUFFIX, LOCKS_SEGMENT, Sanitizer};
pub(crate) use mapper::normalize_prefix;
pub use sanitize::safe_key;
