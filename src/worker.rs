//! Job consumption with bounded concurrency.
//!
//! A [`Worker`] pulls jobs from a [`JobSource`] and runs each one through a
//! shared [`Pipeline`] on its own task. Lifecycle is two-phase: construct
//! with [`Worker::new`], then begin consuming with [`Worker::start`].

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::delivery::HttpClient;
use crate::job::WebhookJob;
use crate::pipeline::Pipeline;
use crate::queue::{JobSource, LogPublisher, QueueError};
use crate::time::{Clock, SystemClock};

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;

/// Default number of deliveries allowed in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Lifecycle errors.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// [`Worker::start`] was called more than once.
    #[error("Worker has already been started")]
    AlreadyStarted,

    /// [`Worker::stop`] or [`Worker::wait`] was called before [`Worker::start`].
    #[error("Worker has not been started")]
    NotStarted,

    /// The job source failed and consumption ended early.
    #[error("Job source failed: {0}")]
    Source(#[source] QueueError),
}

/// Consumes jobs and delivers them concurrently.
///
/// Deliveries are spawned onto the runtime passed to [`Worker::new`]; at most
/// `max_in_flight` run at once and the next job is not pulled until one
/// finishes. Every accepted job publishes exactly one log record, including
/// jobs still in flight when [`Worker::stop`] is called.
pub struct Worker<H, P, C = SystemClock> {
    runtime: Handle,
    pipeline: Arc<Pipeline<H, P, C>>,
    max_in_flight: usize,
    started: AtomicBool,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    failure: Arc<Mutex<Option<QueueError>>>,
}

impl<H, P, C> Worker<H, P, C> {
    /// Creates an idle worker that will spawn onto `runtime`.
    #[must_use]
    pub fn new(runtime: Handle, pipeline: Pipeline<H, P, C>) -> Self {
        Self {
            runtime,
            pipeline: Arc::new(pipeline),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            started: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Sets the concurrency limit. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Returns the concurrency limit.
    #[must_use]
    pub const fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Returns true once [`Worker::start`] has succeeded.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Stops pulling new jobs, then waits for in-flight deliveries to finish
    /// and publish their logs.
    ///
    /// Safe to call concurrently with [`Worker::wait`] and more than once.
    ///
    /// # Errors
    ///
    /// - [`WorkerError::NotStarted`] if the worker was never started
    /// - [`WorkerError::Source`] if the job source failed before the stop
    pub async fn stop(&self) -> Result<(), WorkerError> {
        self.ensure_started()?;

        tracing::info!("Stopping worker, draining in-flight deliveries");
        self.shutdown.cancel();
        self.tasks.wait().await;

        self.take_failure()
    }

    /// Waits until the source is exhausted (or the worker is stopped) and
    /// every accepted delivery has completed.
    ///
    /// Cancel-safe: dropping the returned future leaves the worker running.
    ///
    /// # Errors
    ///
    /// - [`WorkerError::NotStarted`] if the worker was never started
    /// - [`WorkerError::Source`] if consumption ended on a source failure
    pub async fn wait(&self) -> Result<(), WorkerError> {
        self.ensure_started()?;
        self.tasks.wait().await;
        self.take_failure()
    }

    fn ensure_started(&self) -> Result<(), WorkerError> {
        if self.is_started() {
            Ok(())
        } else {
            Err(WorkerError::NotStarted)
        }
    }

    fn take_failure(&self) -> Result<(), WorkerError> {
        let failure = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        failure.map_or(Ok(()), |e| Err(WorkerError::Source(e)))
    }
}

impl<H, P, C> Worker<H, P, C>
where
    H: HttpClient + 'static,
    P: LogPublisher + 'static,
    C: Clock + 'static,
{
    /// Begins consuming `source` on the worker's runtime.
    ///
    /// Returns immediately; use [`Worker::wait`] or [`Worker::stop`] to join.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::AlreadyStarted`] on every call after the first.
    pub fn start<S>(&self, source: S) -> Result<(), WorkerError>
    where
        S: JobSource + 'static,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(WorkerError::AlreadyStarted);
        }

        let consumer = Consumer {
            runtime: self.runtime.clone(),
            pipeline: Arc::clone(&self.pipeline),
            permits: Arc::new(Semaphore::new(self.max_in_flight)),
            shutdown: self.shutdown.clone(),
            tasks: self.tasks.clone(),
            failure: Arc::clone(&self.failure),
        };

        self.tasks.spawn_on(consumer.run(source), &self.runtime);
        // Deliveries are still tracked after close; wait() returns once all finish.
        self.tasks.close();

        tracing::info!(max_in_flight = self.max_in_flight, "Worker started");
        Ok(())
    }
}

/// State owned by the consumer task.
struct Consumer<H, P, C> {
    runtime: Handle,
    pipeline: Arc<Pipeline<H, P, C>>,
    permits: Arc<Semaphore>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    failure: Arc<Mutex<Option<QueueError>>>,
}

impl<H, P, C> Consumer<H, P, C>
where
    H: HttpClient + 'static,
    P: LogPublisher + 'static,
    C: Clock + 'static,
{
    async fn run<S: JobSource>(self, mut source: S) {
        let mut accepted = 0usize;

        loop {
            let permit = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                permit = Arc::clone(&self.permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let next = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                next = source.next_job() => next,
            };

            match next {
                Some(Ok(job)) => {
                    self.dispatch(job, permit);
                    accepted += 1;
                }
                Some(Err(e)) => {
                    if self.reject(e).is_break() {
                        break;
                    }
                }
                None => {
                    tracing::debug!("Job source exhausted");
                    break;
                }
            }
        }

        tracing::info!(accepted, "Worker stopped consuming jobs");
    }

    fn dispatch(&self, job: WebhookJob, permit: OwnedSemaphorePermit) {
        let pipeline = Arc::clone(&self.pipeline);

        self.tasks.spawn_on(
            async move {
                pipeline.handle(job).await;
                drop(permit);
            },
            &self.runtime,
        );
    }

    fn reject(&self, error: QueueError) -> ControlFlow<()> {
        if !error.is_fatal() {
            tracing::warn!("Skipping job: {error}");
            return ControlFlow::Continue(());
        }

        tracing::error!("Job source failed, stopping consumption: {error}");
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        ControlFlow::Break(())
    }
}
