use crate::backend::{MemoryBackend, ObjectBackend, ObjectInfo};
use crate::clock::ManualClock;
use crate::error::Result;
use crate::keys::KeyMapper;
use crate::locks::LockManager;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, LazyLock, Mutex, MutexGuard};

/// A lock manager over a fresh in-memory bucket, driven by a manual clock.
pub(crate) struct ManualHarness {
    pub backend: MemoryBackend,
    pub clock: ManualClock,
    pub locks: LockManager,
    pub keys: KeyMapper,
}

pub(crate) fn manual_harness() -> ManualHarness {
    let clock = ManualClock::starting_now();
    let backend = MemoryBackend::with_clock(Arc::new(clock.clone()));
    let keys = KeyMapper::default();
    let locks = LockManager::new(Arc::new(backend.clone()), keys.clone())
        .with_clock(Arc::new(clock.clone()));
    ManualHarness {
        backend,
        clock,
        locks,
        keys,
    }
}

/// Wraps a backend so the first `racers` existence checks rendezvous on a
/// barrier after reading, forcing every racer to observe "absent" before any
/// of them writes its marker.
#[derive(Debug)]
pub(crate) struct RacyBackend {
    inner: MemoryBackend,
    barrier: Barrier,
    remaining: AtomicUsize,
}

impl RacyBackend {
    pub(crate) fn new(inner: MemoryBackend, racers: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(racers),
            remaining: AtomicUsize::new(racers),
        }
    }
}

impl ObjectBackend for RacyBackend {
    fn exists(&self, path: &str) -> Result<bool> {
        let found = self.inner.exists(path)?;
        let armed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            self.barrier.wait();
        }
        Ok(found)
    }

    fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.get(path)
    }

    fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        self.inner.put(path, data)
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.inner.delete(path)
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        self.inner.list_prefix(prefix)
    }

    fn stat(&self, path: &str) -> Result<ObjectInfo> {
        self.inner.stat(path)
    }
}

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Switches the process working directory for the life of the guard.
pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory is process-global; hold the lock even if a
        // #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}
