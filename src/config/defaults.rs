//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default number of deliveries in flight at once.
pub const MAX_IN_FLIGHT: usize = crate::worker::DEFAULT_MAX_IN_FLIGHT;

/// Default bound on a single HTTP call, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = crate::pipeline::DEFAULT_REQUEST_TIMEOUT.as_secs();

/// Default time allowed for in-flight deliveries to drain on shutdown, in seconds.
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default output path for the `init` subcommand.
pub const CONFIG_FILE: &str = "webhook-worker.toml";

/// Default request timeout as Duration.
#[must_use]
pub const fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

/// Default shutdown timeout as Duration.
#[must_use]
pub const fn shutdown_timeout() -> Duration {
    Duration::from_secs(SHUTDOWN_TIMEOUT_SECS)
}
