//! Application execution logic.
//!
//! Wires the configured job input, HTTP client, and log output into a
//! [`Worker`] and runs it until the input is exhausted or a shutdown
//! signal arrives.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::runtime::Handle;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use webhook_worker::config::ValidatedConfig;
use webhook_worker::delivery::{HttpClient, HttpError, ReqwestClient};
use webhook_worker::pipeline::Pipeline;
use webhook_worker::queue::{JsonLinesSource, QueueError, forward_json_lines_until, log_channel};
use webhook_worker::worker::{Worker, WorkerError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Buffered job input (file or stdin).
type JobInput = Box<dyn AsyncBufRead + Unpin + Send>;

/// Log output sink (file or stdout).
type LogOutput = Box<dyn AsyncWrite + Unpin + Send>;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to build the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// Failed to open the job input file.
    #[error("Failed to open job input '{}': {source}", path.display())]
    OpenJobs {
        /// Path to the job file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to open the log output file.
    #[error("Failed to open log output '{}': {source}", path.display())]
    OpenLogs {
        /// Path to the log file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The worker ended with an error.
    #[error("Worker failed: {0}")]
    Worker(#[from] WorkerError),

    /// Writing delivery logs failed.
    #[error("Failed to write delivery logs: {0}")]
    Output(#[source] QueueError),

    /// The log writer task panicked or was cancelled.
    #[error("Log writer task failed: {0}")]
    OutputTask(#[source] tokio::task::JoinError),

    /// In-flight deliveries did not drain in time.
    #[error("Shutdown timed out after {}s with deliveries still in flight", .0.as_secs())]
    ShutdownTimeout(Duration),
}

/// Executes the worker until the job input is exhausted or a shutdown
/// signal (Ctrl+C / SIGTERM) is received.
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client cannot be built
/// - The job input or log output cannot be opened
/// - Reading jobs or writing logs fails
/// - In-flight deliveries do not finish within the shutdown timeout
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires real
/// stdio and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let client = create_client(&config)?;
    let input = open_jobs(config.jobs.as_deref()).await?;
    let output = open_logs(config.logs.as_deref()).await?;

    let written = run_worker(&config, client, input, output, shutdown_signal()).await?;
    tracing::info!(written, "Worker finished");

    Ok(())
}

/// Creates the HTTP client from configuration.
fn create_client(config: &ValidatedConfig) -> Result<ReqwestClient, RunError> {
    let client = ReqwestClient::with_timeout(config.request_timeout)
        .map_err(RunError::HttpClient)?
        .with_status_policy(config.status_policy);

    Ok(client)
}

/// Opens the job input, falling back to stdin.
async fn open_jobs(path: Option<&Path>) -> Result<JobInput, RunError> {
    let Some(path) = path else {
        tracing::debug!("Reading jobs from stdin");
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    };

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| RunError::OpenJobs {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::debug!("Reading jobs from {}", path.display());
    Ok(Box::new(BufReader::new(file)))
}

/// Opens the log output for append, falling back to stdout.
async fn open_logs(path: Option<&Path>) -> Result<LogOutput, RunError> {
    let Some(path) = path else {
        tracing::debug!("Writing delivery logs to stdout");
        return Ok(Box::new(tokio::io::stdout()));
    };

    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| RunError::OpenLogs {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::debug!("Appending delivery logs to {}", path.display());
    Ok(Box::new(file))
}

/// Runs a worker over `input`, writing logs to `output`, until the input is
/// exhausted or `shutdown` completes.
///
/// Returns the number of log records written.
async fn run_worker<H, F>(
    config: &ValidatedConfig,
    client: H,
    input: JobInput,
    output: LogOutput,
    shutdown: F,
) -> Result<usize, RunError>
where
    H: HttpClient + 'static,
    F: Future<Output = ()>,
{
    let (publisher, logs) = log_channel();
    let close_logs = CancellationToken::new();
    let writer = tokio::spawn(forward_json_lines_until(logs, output, close_logs.clone()));

    let pipeline =
        Pipeline::new(client, publisher).with_request_timeout(config.request_timeout);
    let worker =
        Worker::new(Handle::current(), pipeline).with_max_in_flight(config.max_in_flight);
    worker.start(JsonLinesSource::new(input))?;

    tokio::pin!(shutdown);
    let outcome = tokio::select! {
        result = worker.wait() => result.map_err(RunError::from),
        () = &mut shutdown => {
            tracing::info!("Shutdown signal received, stopping...");
            stop_within(&worker, config.shutdown_timeout, &close_logs).await
        }
    };

    // Releases the last publisher so the writer drains and exits.
    drop(worker);
    let written = writer
        .await
        .map_err(RunError::OutputTask)?
        .map_err(RunError::Output)?;

    outcome?;
    Ok(written)
}

/// Stops `worker`, giving in-flight deliveries `timeout` to finish.
///
/// On timeout the log queue is closed so records already published are
/// still written; deliveries that have not finished produce no record.
async fn stop_within<H, P, C>(
    worker: &Worker<H, P, C>,
    timeout: Duration,
    close_logs: &CancellationToken,
) -> Result<(), RunError> {
    match tokio::time::timeout(timeout, worker.stop()).await {
        Ok(result) => result.map_err(RunError::from),
        Err(_) => {
            tracing::warn!(
                "Deliveries still in flight after {}s, abandoning them",
                timeout.as_secs()
            );
            close_logs.cancel();
            Err(RunError::ShutdownTimeout(timeout))
        }
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
