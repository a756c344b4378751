//! Atomic file writes for the filesystem backend.
//!
//! Every object write follows the same pattern:
//! 1. Write content to a uniquely named temporary file in the target directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! Readers therefore see either the old object or the new one, never a
//! partial write. On crash a temporary file may remain; its name ends with
//! [`TEMP_SUFFIX`] so listings can skip it.

use crate::error::{Result, StoreError};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Suffix of in-flight temporary files.
pub const TEMP_SUFFIX: &str = ".bucketlock-tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Atomically write bytes to a file, creating parent directories as needed.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content, false)?;
    atomic_replace(&temp_path, path)
}

/// Write bytes to a file only if it does not exist yet.
///
/// Uses `create_new`, so exactly one of several concurrent callers succeeds.
/// The others get [`StoreError::AlreadyLocked`].
pub fn create_exclusive<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    write_and_sync(path, content, true)
}

/// Whether a file name belongs to an in-flight atomic write.
///
/// Only the generated shape `.<name>.<pid>.<counter>.bucketlock-tmp` matches;
/// an object that merely ends in the suffix is not a temp file.
pub fn is_temp_file(name: &str) -> bool {
    let Some(stem) = name
        .strip_suffix(TEMP_SUFFIX)
        .and_then(|rest| rest.strip_prefix('.'))
    else {
        return false;
    };

    let mut fields = stem.rsplitn(3, '.');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(counter), Some(pid), Some(file)) => {
            !file.is_empty() && is_digits(pid) && is_digits(counter)
        }
        _ => false,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            StoreError::io_with_source(
                format!("failed to create parent directory '{}'", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}

/// Generate a temporary file path next to the target.
///
/// The pid and a process-wide counter keep concurrent writers to the same
/// target from sharing a temp file.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StoreError::io(format!("invalid file path '{}'", target.display())))?;

    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(".{}.{}.{}{}", filename, std::process::id(), n, TEMP_SUFFIX);
    Ok(parent.join(temp_name))
}

fn write_and_sync(path: &Path, content: &[u8], exclusive: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if exclusive {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }

    let mut file = options.open(path).map_err(|e| {
        if exclusive && e.kind() == std::io::ErrorKind::AlreadyExists {
            StoreError::AlreadyLocked {
                path: path.display().to_string(),
            }
        } else {
            StoreError::io_with_source(format!("failed to create '{}'", path.display()), e)
        }
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        StoreError::io_with_source(format!("failed to write '{}'", path.display()), e)
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        StoreError::io_with_source(format!("failed to sync '{}'", path.display()), e)
    })?;

    Ok(())
}

/// Rename `source` over `target`. `rename` replaces existing files on both
/// POSIX and Windows.
fn atomic_replace(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        StoreError::io_with_source(
            format!("failed to atomically replace '{}'", target.display()),
            e,
        )
    })?;

    // Persist the directory entry too.
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}
