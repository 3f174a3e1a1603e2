//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::delivery::StatusPolicy;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Job input file. `None` reads from stdin.
    pub jobs: Option<PathBuf>,

    /// Log output file, opened for append. `None` writes to stdout.
    pub logs: Option<PathBuf>,

    /// Maximum number of deliveries in flight at once
    pub max_in_flight: usize,

    /// Bound on a single HTTP call
    pub request_timeout: Duration,

    /// Time allowed for in-flight deliveries to drain on shutdown
    pub shutdown_timeout: Duration,

    /// How non-2xx responses are classified
    pub status_policy: StatusPolicy,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = |path: Option<&PathBuf>, fallback: &str| {
            path.map_or_else(|| fallback.to_string(), |p| p.display().to_string())
        };

        write!(
            f,
            "Config {{ jobs: {}, logs: {}, max_in_flight: {}, timeout: {}s, \
             shutdown_timeout: {}s, status_policy: {:?} }}",
            path_str(self.jobs.as_ref(), "stdin"),
            path_str(self.logs.as_ref(), "stdout"),
            self.max_in_flight,
            self.request_timeout.as_secs(),
            self.shutdown_timeout.as_secs(),
            self.status_policy,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_in_flight` is zero
    /// - Duration values are zero
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let max_in_flight = Self::resolve_max_in_flight(cli, toml)?;

        let request_timeout = resolve_duration(
            field::TIMEOUT,
            cli.timeout,
            toml.and_then(|t| t.http.timeout),
            defaults::REQUEST_TIMEOUT_SECS,
        )?;

        let shutdown_timeout = resolve_duration(
            field::SHUTDOWN_TIMEOUT,
            cli.shutdown_timeout,
            toml.and_then(|t| t.worker.shutdown_timeout),
            defaults::SHUTDOWN_TIMEOUT_SECS,
        )?;

        // Flags only enable
        let fail_on_error_status =
            cli.fail_on_error_status || toml.is_some_and(|t| t.http.fail_on_error_status);
        let status_policy = if fail_on_error_status {
            StatusPolicy::RejectErrorStatus
        } else {
            StatusPolicy::AcceptAll
        };

        Ok(Self {
            jobs: cli
                .jobs
                .clone()
                .or_else(|| toml.and_then(|t| t.queue.jobs.clone())),
            logs: cli
                .logs
                .clone()
                .or_else(|| toml.and_then(|t| t.queue.logs.clone())),
            max_in_flight,
            request_timeout,
            shutdown_timeout,
            status_policy,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_max_in_flight(cli: &Cli, toml: Option<&TomlConfig>) -> Result<usize, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let max_in_flight = cli
            .max_in_flight
            .or_else(|| toml.and_then(|t| t.worker.max_in_flight))
            .unwrap_or(defaults::MAX_IN_FLIGHT);

        if max_in_flight == 0 {
            return Err(ConfigError::InvalidValue {
                field: field::MAX_IN_FLIGHT,
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(max_in_flight)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn resolve_duration(
    field: &'static str,
    cli: Option<u64>,
    toml: Option<u64>,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    let seconds = cli.or(toml).unwrap_or(default_secs);

    if seconds == 0 {
        return Err(ConfigError::zero_duration(field));
    }

    Ok(Duration::from_secs(seconds))
}
