//! Command implementations for bucketlock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command runs against a [`Storage`] opened from the
//! config file and writes its report to the given output.

mod lock;
mod values;


use crate::cli::{Cli, Command, LockAction, LockCommand};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::storage::Storage;
use std::io::{self, Write};
use tracing::debug;

/// Dispatch a parsed command line to its implementation.
///
/// Loads the config (defaults if the file is absent), opens the store and
/// runs the command with stdout as output.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(&cli.config)?;
    debug!(config = %cli.config.display(), "loaded config");
    let storage = Storage::open(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&storage, cli.command, &mut out)
}

/// Run a command against an already opened store.
pub fn run(storage: &Storage, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Get(args) => values::cmd_get(storage, args, out),
        Command::Put(args) => values::cmd_put(storage, args, out),
        Command::Rm(args) => values::cmd_rm(storage, args, out),
        Command::Ls(args) => values::cmd_ls(storage, args, out),
        Command::Stat(args) => values::cmd_stat(storage, args, out),
        Command::Lock(lock_cmd) => dispatch_lock(storage, lock_cmd, out),
    }
}

/// Dispatch lock subcommands.
fn dispatch_lock(storage: &Storage, lock_cmd: LockCommand, out: &mut dyn Write) -> Result<()> {
    match lock_cmd.action {
        LockAction::List(args) => lock::cmd_lock_list(storage, args, out),
        LockAction::Clear(args) => lock::cmd_lock_clear(storage, args, out),
        LockAction::Acquire(args) => lock::cmd_lock_acquire(storage, args, out),
        LockAction::Release(args) => lock::cmd_lock_release(storage, args, out),
    }
}

fn output_error(e: io::Error) -> StoreError {
    StoreError::io_with_source("failed to write output", e)
}

/// Write `value` as pretty JSON followed by a newline.
fn write_json<T: serde::Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::io_with_source("failed to serialize output", e))?;
    writeln!(out, "{}", json).map_err(output_error)
}
