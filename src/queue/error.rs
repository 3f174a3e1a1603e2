//! Error types for queue transports.

use thiserror::Error;

/// Error type for queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// An inbound message could not be decoded into a job.
    #[error("Malformed job message on line {line}: {source}")]
    Malformed {
        /// 1-based position of the message in the stream
        line: usize,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// An inbound message was not valid UTF-8.
    #[error("Job message on line {line} is not valid UTF-8: {source}")]
    InvalidEncoding {
        /// 1-based position of the message in the stream
        line: usize,
        /// Underlying decode error
        #[source]
        source: std::io::Error,
    },

    /// Reading from the inbound stream failed.
    #[error("Failed to read job stream: {0}")]
    Read(#[source] std::io::Error),

    /// Writing to the outbound stream failed.
    #[error("Failed to write log stream: {0}")]
    Write(#[source] std::io::Error),

    /// A log record could not be encoded.
    #[error("Failed to encode log item: {0}")]
    Encode(#[source] serde_json::Error),

    /// The other end of the queue has gone away.
    #[error("Queue is closed")]
    Closed,
}

impl QueueError {
    /// Returns true if the source cannot produce further jobs after this error.
    ///
    /// A malformed or badly encoded message only affects itself; I/O
    /// failures end the stream.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Malformed { .. } | Self::InvalidEncoding { .. })
    }
}
