//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::defaults;

/// Webhook delivery worker
///
/// Reads webhook jobs as newline-delimited JSON, posts each payload to its
/// endpoint, and writes one delivery log per job as newline-delimited JSON.
#[derive(Debug, Parser)]
#[command(name = "webhook-worker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// File to read jobs from (default: stdin)
    #[arg(long, value_name = "PATH")]
    pub jobs: Option<PathBuf>,

    /// File to append delivery logs to (default: stdout)
    #[arg(long, value_name = "PATH")]
    pub logs: Option<PathBuf>,

    /// Maximum number of deliveries in flight at once
    #[arg(long = "max-in-flight", value_name = "N")]
    pub max_in_flight: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds to wait for in-flight deliveries on shutdown
    #[arg(long = "shutdown-timeout", value_name = "SECS")]
    pub shutdown_timeout: Option<u64>,

    /// Log non-2xx responses as failed deliveries
    #[arg(long = "fail-on-error-status")]
    pub fail_on_error_status: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for webhook-worker
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
