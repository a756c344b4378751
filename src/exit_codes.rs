//! Exit code constants for the bucketlock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Object not found
//! - 3: Storage backend failure
//! - 4: Lock acquisition failure (cancelled or possible deadlock)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// The requested object does not exist.
pub const NOT_FOUND: i32 = 2;

/// The storage backend failed.
pub const BACKEND_FAILURE: i32 = 3;

/// Lock acquisition failure.
pub const LOCK_FAILURE: i32 = 4;
