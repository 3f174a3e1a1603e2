//! Webhook delivery pipeline.
//!
//! Turns one [`WebhookJob`] into exactly one published [`LogItem`]:
//! time the HTTP call, classify the outcome, format the log, publish it.

use std::time::Duration;

use tokio::time::Instant;

use crate::delivery::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::job::WebhookJob;
use crate::log::{LogItem, LogMessage, LogStatus};
use crate::queue::LogPublisher;
use crate::time::{Clock, SystemClock};

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

/// Default bound on a single HTTP call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers jobs and publishes their outcome.
///
/// Holds no per-job state, so one instance can be shared (behind an `Arc`)
/// by any number of concurrent deliveries.
///
/// # Outcome policy
///
/// Any response the client returns is a successful delivery, whatever its
/// status code. Only an [`HttpError`] (including timeouts and requests that
/// could not be built from the job) produces a failure log.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `P`: The log publisher
/// - `C`: The clock used for log timestamps (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct Pipeline<H, P, C = SystemClock> {
    client: H,
    publisher: P,
    clock: C,
    request_timeout: Duration,
}

impl<H, P> Pipeline<H, P, SystemClock> {
    /// Creates a pipeline with the system clock and [`DEFAULT_REQUEST_TIMEOUT`].
    #[must_use]
    pub const fn new(client: H, publisher: P) -> Self {
        Self {
            client,
            publisher,
            clock: SystemClock,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl<H, P, C> Pipeline<H, P, C> {
    /// Sets the clock used for log timestamps.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> Pipeline<H, P, C2> {
        Pipeline {
            client: self.client,
            publisher: self.publisher,
            clock,
            request_timeout: self.request_timeout,
        }
    }

    /// Sets the bound on each HTTP call.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the configured request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl<H: HttpClient, P: LogPublisher, C: Clock> Pipeline<H, P, C> {
    /// Delivers `job` and publishes its log record.
    ///
    /// Never fails: delivery errors become a [`LogStatus::Failure`] record and
    /// publish errors are logged. Returns the status of the published record.
    pub async fn handle(&self, job: WebhookJob) -> LogStatus {
        tracing::debug!(
            request_id = %job.request_id,
            url = %job.url,
            "Delivering webhook"
        );

        let item = self.deliver(&job).await;
        let status = item.status;

        match &item.message {
            LogMessage::Delivered { .. } => tracing::info!(
                request_id = %item.request_id,
                duration_ms = item.duration_ms,
                "Webhook delivered"
            ),
            LogMessage::Failed { error } => tracing::warn!(
                request_id = %item.request_id,
                duration_ms = item.duration_ms,
                "Webhook delivery failed: {error}"
            ),
        }

        if let Err(e) = self.publisher.publish(item) {
            tracing::error!(request_id = %job.request_id, "Failed to publish delivery log: {e}");
        }

        status
    }

    /// Delivers `job` and builds its log record without publishing it.
    pub async fn deliver(&self, job: &WebhookJob) -> LogItem {
        let started = Instant::now();
        let outcome = self.call(job).await;
        let elapsed = started.elapsed();

        let message = match outcome {
            Ok(response) => LogMessage::delivered(&job.payload, &response.body_text_lossy()),
            Err(e) => LogMessage::failed(e.describe(&job.url)),
        };

        LogItem::new(job, message, elapsed, self.clock.now())
    }

    /// Performs the bounded HTTP call for `job`.
    async fn call(&self, job: &WebhookJob) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::post_json(&job.url, &job.payload, &job.headers)?;

        tokio::time::timeout(self.request_timeout, self.client.request(request))
            .await
            .map_err(|_| HttpError::Timeout)?
    }
}
