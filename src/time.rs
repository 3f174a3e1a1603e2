//! Time abstraction for testability.
//!
//! This module provides a [`Clock`] trait that allows injecting mock clocks
//! in tests while using the real system clock in production, plus the
//! fixed timestamp representation used in delivery logs.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

/// `strftime` pattern for log timestamps.
///
/// UTC with millisecond precision, compatible with MySQL `DATETIME(3)`.
/// Fixed width, so lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Abstraction over system time for testability.
///
/// # Example
///
/// ```
/// use webhook_worker::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Formats a point in time using [`TIMESTAMP_FORMAT`].
///
/// ```
/// use std::time::{Duration, UNIX_EPOCH};
/// use webhook_worker::time::format_timestamp;
///
/// let t = UNIX_EPOCH + Duration::from_millis(1_709_294_400_042);
/// assert_eq!(format_timestamp(t), "2024-03-01 12:00:00.042");
/// ```
#[must_use]
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(TIMESTAMP_FORMAT).to_string()
}

/// Converts an elapsed duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
