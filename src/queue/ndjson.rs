//! Newline-delimited JSON transport.
//!
//! Each line of the inbound stream is one [`WebhookJob`]; each
//! [`LogItem`] is written as one line of the outbound stream.

use std::io;

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;

use crate::job::WebhookJob;
use crate::log::LogItem;

use super::{JobSource, QueueError};

/// Reads jobs from a newline-delimited JSON stream.
///
/// Blank lines are skipped. A line that is not valid UTF-8 yields
/// [`QueueError::InvalidEncoding`], one that does not decode as a job yields
/// [`QueueError::Malformed`]; either way the next call continues with the
/// following line.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    lines: LinesStream<R>,
    line: usize,
}

impl<R: AsyncBufRead> JsonLinesSource<R> {
    /// Wraps a buffered reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        use tokio::io::AsyncBufReadExt;

        Self {
            lines: LinesStream::new(reader.lines()),
            line: 0,
        }
    }
}

impl<R> JobSource for JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_job(&mut self) -> Option<Result<WebhookJob, QueueError>> {
        loop {
            let next = self.lines.next().await?;
            self.line += 1;

            let text = match next {
                Ok(text) => text,
                // The offending line has already been consumed
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    return Some(Err(QueueError::InvalidEncoding {
                        line: self.line,
                        source: e,
                    }));
                }
                Err(e) => return Some(Err(QueueError::Read(e))),
            };

            if text.trim().is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(&text).map_err(|source| QueueError::Malformed {
                    line: self.line,
                    source,
                }),
            );
        }
    }
}

/// Drains `logs` into `writer`, one JSON document per line.
///
/// Flushes after every record so downstream readers see each log as soon
/// as it is published. Returns the number of records written once every
/// publisher has been dropped.
///
/// # Errors
///
/// Returns [`QueueError::Encode`] or [`QueueError::Write`] on the first
/// record that cannot be written; remaining records are not drained.
pub async fn forward_json_lines<W>(
    logs: mpsc::UnboundedReceiver<LogItem>,
    writer: W,
) -> Result<usize, QueueError>
where
    W: AsyncWrite + Unpin,
{
    forward_json_lines_until(logs, writer, CancellationToken::new()).await
}

/// Like [`forward_json_lines`], but also finishes when `close` is cancelled.
///
/// On cancellation the queue is closed to further publishes and every record
/// already published is still written before returning.
///
/// # Errors
///
/// Same as [`forward_json_lines`].
pub async fn forward_json_lines_until<W>(
    mut logs: mpsc::UnboundedReceiver<LogItem>,
    mut writer: W,
    close: CancellationToken,
) -> Result<usize, QueueError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;

    loop {
        let item = tokio::select! {
            biased;
            item = logs.recv() => item,
            () = close.cancelled() => {
                // recv now yields the buffered records, then None
                logs.close();
                continue;
            }
        };
        let Some(item) = item else { break };

        let mut line = serde_json::to_vec(&item).map_err(QueueError::Encode)?;
        line.push(b'\n');

        writer.write_all(&line).await.map_err(QueueError::Write)?;
        writer.flush().await.map_err(QueueError::Write)?;
        written += 1;
    }

    Ok(written)
}
