//! Filesystem object backend.
//!
//! One directory plays the role of a bucket. An object path such as
//! `certmagic/locks/a.lock` becomes the file `<root>/certmagic/locks/a.lock`.
//! Writes are atomic (temp file plus rename), and lock markers can use a real
//! exclusive create, which closes the check-then-write race that plain object
//! stores leave open.
//!
//! # Limitations
//!
//! - An object cannot share its path with a directory, so `a/b` and `a/b/c`
//!   cannot both exist.
//! - Modification times come from the filesystem and have its resolution.

use super::{ObjectBackend, ObjectInfo};
use crate::error::{Result, StoreError};
use crate::fs::{atomic_write, create_exclusive, is_temp_file};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Object backend rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Open a backend rooted at `root`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            StoreError::io_with_source(
                format!("failed to create backend root '{}'", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The directory backing this bucket.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an object path to a file path under the root.
    ///
    /// Rejects empty, `.`, `..` and absolute components so a path can never
    /// leave the root. Names shaped like in-flight temp files are reserved,
    /// since listings skip them.
    fn file_path(&self, path: &str) -> Result<PathBuf> {
        let mut file = self.root.clone();
        let mut any = false;
        for segment in path.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(StoreError::io(format!("invalid object path '{path}'")));
            }
            if is_temp_file(segment) {
                return Err(StoreError::io(format!(
                    "object path '{path}' uses a reserved temp file name"
                )));
            }
            file.push(segment);
            any = true;
        }
        if !any {
            return Err(StoreError::io(format!("invalid object path '{path}'")));
        }
        Ok(file)
    }

    fn object_info(&self, path: &str, metadata: &fs::Metadata) -> Result<ObjectInfo> {
        let modified = metadata.modified().map_err(|e| {
            StoreError::io_with_source(format!("failed to read mtime of '{path}'"), e)
        })?;
        Ok(ObjectInfo {
            path: path.to_string(),
            size: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
        })
    }

    fn walk(&self, dir: &Path, relative: &str, prefix: &str, out: &mut Vec<ObjectInfo>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StoreError::io_with_source(
                    format!("failed to read directory '{}'", dir.display()),
                    e,
                ));
            }
        };

        for entry in entries {
            let entry = entry.map_err(|e| {
                StoreError::io_with_source(
                    format!("failed to read entry in '{}'", dir.display()),
                    e,
                )
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_temp_file(&name) {
                continue;
            }

            let object_path = if relative.is_empty() {
                name
            } else {
                format!("{relative}/{name}")
            };

            // Objects deleted mid-walk are simply skipped.
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StoreError::io_with_source(
                        format!("failed to stat '{object_path}'"),
                        e,
                    ));
                }
            };

            if metadata.is_dir() {
                // Only descend where something under the prefix can live.
                let as_dir = format!("{object_path}/");
                if as_dir.starts_with(prefix) || prefix.starts_with(&as_dir) {
                    self.walk(&entry.path(), &object_path, prefix, out)?;
                }
            } else if object_path.starts_with(prefix) {
                out.push(self.object_info(&object_path, &metadata)?);
            }
        }
        Ok(())
    }
}

impl ObjectBackend for FsBackend {
    fn exists(&self, path: &str) -> Result<bool> {
        let file = self.file_path(path)?;
        match fs::metadata(&file) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io_with_source(
                format!("failed to check '{path}'"),
                e,
            )),
        }
    }

    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let file = self.file_path(path)?;
        match fs::read(&file) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::not_found(path)),
            Err(_) if file.is_dir() => Err(StoreError::not_found(path)),
            Err(e) => Err(StoreError::io_with_source(format!("failed to read '{path}'"), e)),
        }
    }

    fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        let file = self.file_path(path)?;
        atomic_write(&file, data)
    }

    fn delete(&self, path: &str) -> Result<()> {
        let file = self.file_path(path)?;
        match fs::remove_file(&file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io_with_source(
                format!("failed to delete '{path}'"),
                e,
            )),
        }
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut out = Vec::new();
        self.walk(&self.root, "", prefix, &mut out)?;
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    fn stat(&self, path: &str) -> Result<ObjectInfo> {
        let file = self.file_path(path)?;
        match fs::metadata(&file) {
            Ok(metadata) if metadata.is_file() => self.object_info(path, &metadata),
            Ok(_) => Err(StoreError::not_found(path)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::not_found(path)),
            Err(e) => Err(StoreError::io_with_source(format!("failed to stat '{path}'"), e)),
        }
    }

    fn put_if_absent(&self, path: &str, data: &[u8]) -> Option<Result<()>> {
        let result = self.file_path(path).and_then(|file| {
            create_exclusive(&file, data).map_err(|e| match e {
                StoreError::AlreadyLocked { .. } => StoreError::AlreadyLocked {
                    path: path.to_string(),
                },
                other => other,
            })
        });
        Some(result)
    }
}
