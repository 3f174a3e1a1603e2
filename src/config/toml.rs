//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Worker concurrency and lifecycle
    #[serde(default)]
    pub worker: WorkerSection,

    /// Outbound HTTP behavior
    #[serde(default)]
    pub http: HttpSection,

    /// Job input and log output
    #[serde(default)]
    pub queue: QueueSection,
}

/// Worker configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerSection {
    /// Maximum number of deliveries in flight at once
    pub max_in_flight: Option<usize>,

    /// Seconds to wait for in-flight deliveries on shutdown
    pub shutdown_timeout: Option<u64>,
}

/// HTTP configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    /// Per-request timeout in seconds
    pub timeout: Option<u64>,

    /// Log non-2xx responses as failed deliveries
    #[serde(default)]
    pub fail_on_error_status: bool,
}

/// Queue configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSection {
    /// File to read jobs from
    pub jobs: Option<PathBuf>,

    /// File to append delivery logs to
    pub logs: Option<PathBuf>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# webhook-worker configuration file

[worker]
# Maximum number of deliveries in flight at once (default: 10)
max_in_flight = 10

# Seconds to wait for in-flight deliveries on shutdown (default: 30)
# shutdown_timeout = 30

[http]
# Per-request timeout in seconds (default: 30)
timeout = 30

# Log non-2xx responses as failed deliveries instead of successful ones
# fail_on_error_status = false

[queue]
# Newline-delimited JSON job input (default: stdin)
# jobs = "jobs.ndjson"

# Newline-delimited JSON log output, appended (default: stdout)
# logs = "logs.ndjson"
"#
    .to_string()
}
