//! In-process queue transport backed by tokio channels.

use tokio::sync::mpsc;

use crate::job::WebhookJob;
use crate::log::LogItem;

use super::{JobSource, LogPublisher, QueueError};

/// Creates a bounded inbound job queue.
///
/// The sender is the producer side; the [`ChannelSource`] is handed to the
/// worker. The source is exhausted once every sender has been dropped.
///
/// # Panics
///
/// Panics if `capacity` is zero.
#[must_use]
pub fn job_channel(capacity: usize) -> (mpsc::Sender<WebhookJob>, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelSource { rx })
}

/// Creates an unbounded outbound log queue.
///
/// Unbounded so that publishing never waits on the consumer.
#[must_use]
pub fn log_channel() -> (ChannelPublisher, mpsc::UnboundedReceiver<LogItem>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelPublisher { tx }, rx)
}

/// Receiving end of [`job_channel`].
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<WebhookJob>,
}

impl JobSource for ChannelSource {
    async fn next_job(&mut self) -> Option<Result<WebhookJob, QueueError>> {
        // `recv` is cancel-safe
        self.rx.recv().await.map(Ok)
    }
}

/// Sending end of [`log_channel`].
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<LogItem>,
}

impl LogPublisher for ChannelPublisher {
    fn publish(&self, item: LogItem) -> Result<(), QueueError> {
        self.tx.send(item).map_err(|_| QueueError::Closed)
    }
}
