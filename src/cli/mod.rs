//! CLI argument parsing for bucketlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::config::types::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bucketlock: values and best-effort locks over a flat object store.
///
/// Values live at `<prefix>/<key>`; a lock on a key is a marker object at
/// `<prefix>/locks/<key>.lock` that is reclaimed once it goes stale.
#[derive(Parser, Debug)]
#[command(name = "bucketlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file. Defaults apply if it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for bucketlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value stored at a key.
    ///
    /// Writes the raw bytes to stdout.
    Get(GetArgs),

    /// Store a value at a key.
    ///
    /// Reads the value from --file, --value, or stdin when neither is given.
    Put(PutArgs),

    /// Delete the value at a key.
    ///
    /// Deleting a missing key succeeds.
    Rm(RmArgs),

    /// List keys under a prefix.
    Ls(LsArgs),

    /// Show size and modification time of a value.
    Stat(StatArgs),

    /// Lock management commands.
    ///
    /// Inspect, clear, take or release key locks.
    Lock(LockCommand),
}

/// Arguments for the `get` command.
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Key to read.
    pub key: String,
}

/// Arguments for the `put` command.
#[derive(Parser, Debug)]
pub struct PutArgs {
    /// Key to write.
    pub key: String,

    /// Read the value from this file.
    #[arg(long, conflicts_with = "value")]
    pub file: Option<PathBuf>,

    /// Use this string as the value.
    #[arg(long)]
    pub value: Option<String>,
}

/// Arguments for the `rm` command.
#[derive(Parser, Debug)]
pub struct RmArgs {
    /// Key to delete.
    pub key: String,
}

/// Arguments for the `ls` command.
#[derive(Parser, Debug)]
pub struct LsArgs {
    /// Only list keys starting with this prefix.
    #[arg(default_value = "")]
    pub prefix: String,

    /// Accepted for compatibility; the store is flat so listings are always recursive.
    #[arg(short, long)]
    pub recursive: bool,
}

/// Arguments for the `stat` command.
#[derive(Parser, Debug)]
pub struct StatArgs {
    /// Key to inspect.
    pub key: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// List all lock markers.
    ///
    /// Shows each marker's age and whether it is stale.
    List(LockListArgs),

    /// Clear a specific lock.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(LockClearArgs),

    /// Acquire a lock, hold it, then release it.
    ///
    /// Blocks until the lock is free, or gives up after `--wait-ms`. Ctrl-C
    /// is not trapped; an interrupted hold leaves the marker to go stale.
    Acquire(LockAcquireArgs),

    /// Release a lock.
    ///
    /// Releasing a lock that is not held succeeds.
    Release(LockReleaseArgs),
}

/// Arguments for the `lock list` command.
#[derive(Parser, Debug)]
pub struct LockListArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Key whose lock should be cleared.
    pub key: String,

    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `lock acquire` command.
#[derive(Parser, Debug)]
pub struct LockAcquireArgs {
    /// Key to lock.
    pub key: String,

    /// How long to hold the lock before releasing it, in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub hold_ms: u64,

    /// Give up with a lock failure if the lock is not obtained within this
    /// many milliseconds. Waits indefinitely when omitted.
    #[arg(long)]
    pub wait_ms: Option<u64>,
}

/// Arguments for the `lock release` command.
#[derive(Parser, Debug)]
pub struct LockReleaseArgs {
    /// Key whose lock should be released.
    pub key: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_default_config_path() {
        let cli = Cli::try_parse_from(["bucketlock", "get", "a"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("bucketlock.yaml"));
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["bucketlock", "ls", "--config", "/etc/bucketlock.yaml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/bucketlock.yaml"));
    }

    #[test]
    fn parse_get() {
        let cli = Cli::try_parse_from(["bucketlock", "get", "sites/example.com"]).unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.key, "sites/example.com");
        } else {
            panic!("Expected Get command");
        }
    }

    #[test]
    fn parse_put_with_value() {
        let cli = Cli::try_parse_from(["bucketlock", "put", "k", "--value", "hello"]).unwrap();
        if let Command::Put(args) = cli.command {
            assert_eq!(args.key, "k");
            assert_eq!(args.value.as_deref(), Some("hello"));
            assert!(args.file.is_none());
        } else {
            panic!("Expected Put command");
        }
    }

    #[test]
    fn parse_put_file_and_value_conflict() {
        let result =
            Cli::try_parse_from(["bucketlock", "put", "k", "--value", "v", "--file", "f.pem"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_ls_defaults() {
        let cli = Cli::try_parse_from(["bucketlock", "ls"]).unwrap();
        if let Command::Ls(args) = cli.command {
            assert_eq!(args.prefix, "");
            assert!(!args.recursive);
        } else {
            panic!("Expected Ls command");
        }
    }

    #[test]
    fn parse_ls_recursive() {
        let cli = Cli::try_parse_from(["bucketlock", "ls", "acme/", "-r"]).unwrap();
        if let Command::Ls(args) = cli.command {
            assert_eq!(args.prefix, "acme/");
            assert!(args.recursive);
        } else {
            panic!("Expected Ls command");
        }
    }

    #[test]
    fn parse_stat_json() {
        let cli = Cli::try_parse_from(["bucketlock", "stat", "k", "--json"]).unwrap();
        if let Command::Stat(args) = cli.command {
            assert!(args.json);
        } else {
            panic!("Expected Stat command");
        }
    }

    #[test]
    fn parse_lock_list() {
        let cli = Cli::try_parse_from(["bucketlock", "lock", "list"]).unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            assert!(matches!(lock_cmd.action, LockAction::List(LockListArgs { json: false })));
        } else {
            panic!("Expected Lock command");
        }
    }

    #[test]
    fn parse_lock_clear() {
        let cli = Cli::try_parse_from(["bucketlock", "lock", "clear", "cert-a", "--force"]).unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            if let LockAction::Clear(args) = lock_cmd.action {
                assert_eq!(args.key, "cert-a");
                assert!(args.force);
            } else {
                panic!("Expected Clear action");
            }
        } else {
            panic!("Expected Lock command");
        }
    }

    #[test]
    fn parse_lock_acquire_hold() {
        let cli =
            Cli::try_parse_from(["bucketlock", "lock", "acquire", "cert-a", "--hold-ms", "250"])
                .unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            if let LockAction::Acquire(args) = lock_cmd.action {
                assert_eq!(args.key, "cert-a");
                assert_eq!(args.hold_ms, 250);
                assert_eq!(args.wait_ms, None);
            } else {
                panic!("Expected Acquire action");
            }
        } else {
            panic!("Expected Lock command");
        }
    }

    #[test]
    fn parse_lock_acquire_wait() {
        let cli =
            Cli::try_parse_from(["bucketlock", "lock", "acquire", "cert-a", "--wait-ms", "50"])
                .unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            if let LockAction::Acquire(args) = lock_cmd.action {
                assert_eq!(args.wait_ms, Some(50));
                assert_eq!(args.hold_ms, 0);
            } else {
                panic!("Expected Acquire action");
            }
        } else {
            panic!("Expected Lock command");
        }
    }

    #[test]
    fn parse_lock_release() {
        let cli = Cli::try_parse_from(["bucketlock", "lock", "release", "cert-a"]).unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            assert!(matches!(lock_cmd.action, LockAction::Release(_)));
        } else {
            panic!("Expected Lock command");
        }
    }
}
