//! Mapping resource keys to object paths.

use super::sanitize::safe_key;
use std::fmt;
use std::sync::Arc;

/// Default root prefix for every object written by bucketlock.
pub const DEFAULT_PREFIX: &str = "certmagic";

/// Directory segment under the prefix that holds lock markers.
pub const LOCKS_SEGMENT: &str = "locks";

/// File suffix for lock markers.
pub const LOCK_SUFFIX: &str = ".lock";

/// A pure function turning a key into a single safe path segment.
pub type Sanitizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Maps logical keys to resource paths and lock-marker paths.
///
/// The mapper is stateless apart from its prefix and sanitizer, and is
/// cheap to clone.
#[derive(Clone)]
pub struct KeyMapper {
    prefix: String,
    sanitize: Sanitizer,
}

impl KeyMapper {
    /// Create a mapper rooted at `prefix` using [`safe_key`] for lock names.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_sanitizer(prefix, Arc::new(safe_key))
    }

    /// Create a mapper with a custom sanitizer.
    ///
    /// The sanitizer must never return a string containing `/`; markers would
    /// otherwise land outside the lock directory.
    pub fn with_sanitizer(prefix: impl Into<String>, sanitize: Sanitizer) -> Self {
        let prefix = normalize(&prefix.into());
        Self { prefix, sanitize }
    }

    /// The root prefix, already normalized.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path of the object that stores the value for `key`.
    pub fn resource_path(&self, key: &str) -> String {
        join(&self.prefix, &normalize(key))
    }

    /// Directory that holds every lock marker.
    pub fn lock_dir(&self) -> String {
        join(&self.prefix, LOCKS_SEGMENT)
    }

    /// Path of the marker object whose existence means `key` is locked.
    pub fn lock_marker_path(&self, key: &str) -> String {
        let token = (self.sanitize)(key).replace(['/', '\\'], "");
        format!("{}/{}{}", self.lock_dir(), token, LOCK_SUFFIX)
    }

    /// Whether the value path for `key` falls inside the lock directory.
    ///
    /// Such keys would alias lock markers, so value writes refuse them.
    pub fn is_lock_path(&self, key: &str) -> bool {
        let path = self.resource_path(key);
        let dir = self.lock_dir();
        path == dir || path.strip_prefix(dir.as_str()).is_some_and(|rest| rest.starts_with('/'))
    }

    /// Recover a key from an object path produced by [`resource_path`](Self::resource_path).
    ///
    /// Returns `None` for paths outside the prefix.
    pub fn key_for_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            return Some(rest);
        }
        rest.strip_prefix('/')
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl fmt::Debug for KeyMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMapper")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Slash-normalize a key: unify separators, drop empty and `.` segments, and
/// resolve `..` without ever climbing above the start of the key.
fn normalize(key: &str) -> String {
    let unified = key.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Normalize a listing prefix the way keys are normalized, keeping a
/// trailing `/` so `acme/` still excludes `acmex`.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let mut normalized = normalize(prefix);
    if !normalized.is_empty() && (prefix.ends_with('/') || prefix.ends_with('\\')) {
        normalized.push('/');
    }
    normalized
}

fn join(prefix: &str, rest: &str) -> String {
    match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{rest}"),
    }
}
