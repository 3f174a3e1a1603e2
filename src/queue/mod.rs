//! Queue boundary: where jobs come from and where logs go.
//!
//! The transports themselves (acknowledgment, durability, redelivery) are
//! external; this module only defines the seams the worker talks to and two
//! concrete bindings:
//! - In-process tokio channels ([`ChannelSource`], [`ChannelPublisher`])
//! - Newline-delimited JSON streams ([`JsonLinesSource`], [`forward_json_lines`],
//!   [`forward_json_lines_until`])

mod channel;
mod error;
mod ndjson;


pub use channel::{ChannelPublisher, ChannelSource, job_channel, log_channel};
pub use error::QueueError;
pub use ndjson::{JsonLinesSource, forward_json_lines, forward_json_lines_until};

use std::sync::Arc;

use crate::job::WebhookJob;
use crate::log::LogItem;

/// Inbound queue of delivery jobs.
///
/// # Cancellation
///
/// The worker races `next_job` against its stop signal, so implementations
/// must be cancel-safe: dropping the future must not lose a job.
pub trait JobSource: Send {
    /// Waits for the next job.
    ///
    /// Returns `None` once the source is exhausted. An `Err` describes a
    /// message that could not be turned into a job; see
    /// [`QueueError::is_fatal`] for whether consumption can continue.
    fn next_job(
        &mut self,
    ) -> impl std::future::Future<Output = Option<Result<WebhookJob, QueueError>>> + Send;
}

/// Outbound queue of delivery logs.
///
/// Publishing is fire-and-forget: it must not block, and the caller does not
/// wait for any delivery confirmation.
pub trait LogPublisher: Send + Sync {
    /// Hands one log record to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if the transport no longer accepts records.
    fn publish(&self, item: LogItem) -> Result<(), QueueError>;
}

impl<T: LogPublisher> LogPublisher for Arc<T> {
    fn publish(&self, item: LogItem) -> Result<(), QueueError> {
        (**self).publish(item)
    }
}
