//! The delivery log record published to the outbound queue.

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::WebhookJob;
use crate::time::{duration_millis, format_timestamp};

use super::LogMessage;

/// Terminal outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogStatus {
    /// The endpoint returned a response (any status code).
    Success,
    /// No response was obtained.
    Failure,
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

/// One structured record of a delivery attempt's outcome.
///
/// Built once per job, handed to the publisher, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogItem {
    /// Fresh UUID v4
    pub id: String,
    /// Copied from the job
    pub project_id: String,
    /// Copied from the job
    pub function_id: String,
    /// Copied from the job
    pub request_id: String,
    /// Derived from the message shape
    pub status: LogStatus,
    /// Time spent in the HTTP call
    pub duration_ms: u64,
    /// Creation time, see [`crate::time::TIMESTAMP_FORMAT`]
    pub timestamp: String,
    /// Outcome details
    pub message: LogMessage,
}

impl LogItem {
    /// Creates the log record for `job`.
    ///
    /// The status follows the message: [`LogMessage::Delivered`] is
    /// [`LogStatus::Success`], [`LogMessage::Failed`] is [`LogStatus::Failure`].
    #[must_use]
    pub fn new(job: &WebhookJob, message: LogMessage, elapsed: Duration, now: SystemTime) -> Self {
        let status = if message.is_delivered() {
            LogStatus::Success
        } else {
            LogStatus::Failure
        };

        Self {
            id: Uuid::new_v4().to_string(),
            project_id: job.project_id.clone(),
            function_id: job.function_id.clone(),
            request_id: job.request_id.clone(),
            status,
            duration_ms: duration_millis(elapsed),
            timestamp: format_timestamp(now),
            message,
        }
    }
}
