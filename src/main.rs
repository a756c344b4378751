//! Bucketlock CLI.
//!
//! This is the main entry point for the `bucketlock` CLI. It installs the
//! log subscriber, parses arguments, dispatches to the appropriate command
//! handler, and handles errors with proper exit codes.

use bucketlock::cli::Cli;
use bucketlock::{commands, exit_codes};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries command output such as `get` payloads.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bucketlock=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_args();

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
