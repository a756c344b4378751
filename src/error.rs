//! Error types for bucketlock.
//!
//! Uses thiserror for derive macros. Backend failures keep their source
//! error so callers can walk the chain.

use crate::exit_codes;
use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;

/// A shareable boxed error used as the source of backend failures.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Main error type for storage and lock operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// No object exists at the given path.
    #[error("object not found: {path}")]
    NotFound { path: String },

    /// A lock marker is already present. Only used inside the acquire loop.
    #[error("lock marker already exists: {path}")]
    AlreadyLocked { path: String },

    /// Any other backend failure (I/O, permissions, throttling, ...).
    #[error("storage backend error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The caller cancelled an in-progress acquisition.
    #[error("lock acquisition for '{key}' was cancelled")]
    Cancelled { key: String },

    /// A fresh marker blocked acquisition for longer than twice the stale threshold.
    #[error("possible deadlock: waited {}s trying to obtain lock for '{key}'", .waited.num_seconds())]
    DeadlockSuspected { key: String, waited: Duration },

    /// Configuration could not be read, parsed, or validated.
    #[error("config error: {0}")]
    Config(String),

    /// The operator asked for something invalid.
    #[error("{0}")]
    UserError(String),
}

impl StoreError {
    /// Build a `NotFound` error for a path.
    pub fn not_found(path: impl Into<String>) -> Self {
        StoreError::NotFound { path: path.into() }
    }

    /// Build an `Io` error with no underlying source.
    pub fn io(message: impl Into<String>) -> Self {
        StoreError::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Build an `Io` error wrapping an underlying error.
    pub fn io_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Io {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Whether this error means the object is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            StoreError::NotFound { .. } => exit_codes::NOT_FOUND,
            StoreError::Io { .. } => exit_codes::BACKEND_FAILURE,
            StoreError::AlreadyLocked { .. }
            | StoreError::Cancelled { .. }
            | StoreError::DeadlockSuspected { .. } => exit_codes::LOCK_FAILURE,
            StoreError::Config(_) | StoreError::UserError(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for bucketlock operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn not_found_error_has_correct_exit_code() {
        let err = StoreError::not_found("certmagic/a");
        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
        assert!(err.is_not_found());
    }

    #[test]
    fn io_error_has_correct_exit_code() {
        let err = StoreError::io("throttled");
        assert_eq!(err.exit_code(), exit_codes::BACKEND_FAILURE);
        assert!(!err.is_not_found());
    }

    #[test]
    fn lock_errors_have_correct_exit_code() {
        let cancelled = StoreError::Cancelled {
            key: "cert-a".to_string(),
        };
        let deadlock = StoreError::DeadlockSuspected {
            key: "cert-a".to_string(),
            waited: Duration::hours(5),
        };
        assert_eq!(cancelled.exit_code(), exit_codes::LOCK_FAILURE);
        assert_eq!(deadlock.exit_code(), exit_codes::LOCK_FAILURE);
    }

    #[test]
    fn user_and_config_errors_have_correct_exit_code() {
        assert_eq!(
            StoreError::UserError("bad".to_string()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            StoreError::Config("bad".to_string()).exit_code(),
            exit_codes::USER_ERROR
        );
    }

    #[test]
    fn io_error_keeps_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::io_with_source("failed to write object", inner);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "storage backend error: failed to write object");
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = StoreError::DeadlockSuspected {
            key: "cert-a".to_string(),
            waited: Duration::seconds(14401),
        };
        assert_eq!(
            err.to_string(),
            "possible deadlock: waited 14401s trying to obtain lock for 'cert-a'"
        );

        let err = StoreError::Cancelled {
            key: "cert-a".to_string(),
        };
        assert_eq!(err.to_string(), "lock acquisition for 'cert-a' was cancelled");
    }
}
