//! Lock commands: `lock list`, `lock clear`, `lock acquire`, `lock release`.

use super::{output_error, write_json};
use crate::cancel::CancelToken;
use crate::cli::{LockAcquireArgs, LockClearArgs, LockListArgs, LockReleaseArgs};
use crate::error::{Result, StoreError};
use crate::locks::LockGuard;
use crate::storage::Storage;
use std::io::Write;
use std::thread;
use std::time::Duration;
use tracing::debug;

pub(super) fn cmd_lock_list(
    storage: &Storage,
    args: LockListArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let locks = storage.locks.list_locks()?;

    if args.json {
        return write_json(out, &locks);
    }

    if locks.is_empty() {
        writeln!(out, "No active locks.").map_err(output_error)?;
        return Ok(());
    }

    writeln!(out, "Active locks ({}):", locks.len()).map_err(output_error)?;
    writeln!(out).map_err(output_error)?;

    let threshold = storage.locks.stale_threshold().num_minutes();
    for lock in &locks {
        writeln!(out, "  {}:", lock.name).map_err(output_error)?;
        writeln!(
            out,
            "    Modified:   {}",
            lock.modified.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .map_err(output_error)?;
        writeln!(out, "    Age:        {}", lock.age_string()).map_err(output_error)?;
        if lock.is_stale {
            writeln!(
                out,
                "    Status:     STALE (exceeds {} min threshold)",
                threshold
            )
            .map_err(output_error)?;
        }
        writeln!(out, "    Path:       {}", lock.path).map_err(output_error)?;
        writeln!(out).map_err(output_error)?;
    }

    // Summary
    let stale_count = locks.iter().filter(|l| l.is_stale).count();
    if stale_count > 0 {
        writeln!(
            out,
            "Note: {} lock(s) are stale. Use `bucketlock lock clear <key> --force` to clear.",
            stale_count
        )
        .map_err(output_error)?;
    }

    Ok(())
}

pub(super) fn cmd_lock_clear(
    storage: &Storage,
    args: LockClearArgs,
    out: &mut dyn Write,
) -> Result<()> {
    // Require --force flag
    if !args.force {
        return Err(StoreError::UserError(
            "refusing to clear lock without --force flag.\n\n\
             Clearing a lock lets another process in while the holder may still be working.\n\
             Only clear locks if you are certain the lock holder has crashed.\n\n\
             To clear the lock, run:\n  bucketlock lock clear {} --force"
                .replace("{}", &args.key),
        ));
    }

    let cleared = storage.locks.clear_lock(&args.key)?;
    writeln!(out, "Cleared lock: {}", cleared).map_err(output_error)
}

pub(super) fn cmd_lock_acquire(
    storage: &Storage,
    args: LockAcquireArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let guard = acquire_within(storage, &args.key, args.wait_ms)?;
    writeln!(
        out,
        "Acquired lock on '{}' ({}).",
        args.key,
        guard.marker_path()
    )
    .map_err(output_error)?;
    out.flush().map_err(output_error)?;

    if args.hold_ms > 0 {
        thread::sleep(Duration::from_millis(args.hold_ms));
    }

    guard.release()?;
    writeln!(out, "Released lock on '{}'.", args.key).map_err(output_error)
}

/// Block on `key`, cancelling the wait once `wait_ms` elapses.
fn acquire_within(storage: &Storage, key: &str, wait_ms: Option<u64>) -> Result<LockGuard> {
    let Some(wait_ms) = wait_ms else {
        return storage.locks.lock(&CancelToken::new(), key);
    };

    let cancel = CancelToken::new();
    let acquired = CancelToken::new();
    thread::scope(|scope| {
        let timer = {
            let (cancel, acquired) = (cancel.clone(), acquired.clone());
            move || {
                if !acquired.wait_timeout(Duration::from_millis(wait_ms)) {
                    debug!(wait_ms, "lock wait timed out; cancelling");
                    cancel.cancel();
                }
            }
        };
        scope.spawn(timer);

        let result = storage.locks.lock(&cancel, key);
        // Stops the timer early; a late cancel after success is harmless.
        acquired.cancel();
        result
    })
}

pub(super) fn cmd_lock_release(
    storage: &Storage,
    args: LockReleaseArgs,
    out: &mut dyn Write,
) -> Result<()> {
    storage.locks.release(&args.key)?;
    writeln!(out, "Released lock on '{}'.", args.key).map_err(output_error)
}
