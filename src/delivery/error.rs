//! Error types for HTTP delivery.

use thiserror::Error;

/// Error type for a single delivery attempt.
///
/// Every variant means "no usable response was obtained". A response with an
/// error status only ends up here when the client runs with
/// [`StatusPolicy::RejectErrorStatus`](super::StatusPolicy::RejectErrorStatus).
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and failures while reading the response body.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The destination URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A job header had an invalid name or value.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// The offending header name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A response was received but the client classified its status as a failure.
    #[error("Endpoint responded with status {status}")]
    Status {
        /// Status code of the rejected response
        status: http::StatusCode,
        /// Response body, lossily decoded
        body: String,
        /// Response headers in received order
        headers: Vec<(String, String)>,
    },
}

impl HttpError {
    /// Returns true if a response was received before the failure was raised.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Renders the human-readable failure description recorded in delivery logs.
    ///
    /// Failures carrying a response include its status, body and headers:
    ///
    /// ```text
    /// Call to <url> failed with status 500, response body 'oops' and headers [X-Err: 1]
    /// ```
    ///
    /// Headers are listed exactly as carried by the error. For errors built
    /// by [`ReqwestClient`](super::ReqwestClient) that means every received
    /// header, server-added ones such as `content-length` and `date`
    /// included, with lowercase names.
    ///
    /// Everything else is `Call to <url> failed with: <error>`.
    #[must_use]
    pub fn describe(&self, url: &str) -> String {
        match self {
            Self::Status {
                status,
                body,
                headers,
            } => {
                let headers = headers
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                format!(
                    "Call to {url} failed with status {}, response body '{body}' and headers [{headers}]",
                    status.as_u16()
                )
            }
            other => format!("Call to {url} failed with: {other}"),
        }
    }
}
