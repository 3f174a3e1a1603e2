//! Inbound webhook delivery requests.

use serde::{Deserialize, Serialize};

/// One queued request to deliver a payload to an external URL.
///
/// Jobs are read-only input: the worker consumes each one exactly once
/// and never persists it.
///
/// # Wire format
///
/// ```json
/// {
///   "projectId": "p1",
///   "functionId": "f1",
///   "requestId": "r1",
///   "url": "https://example.com/hook",
///   "payload": "{\"event\":\"created\"}",
///   "headers": [["X-Signature", "abc"]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookJob {
    /// Opaque project identifier, copied into the delivery log
    pub project_id: String,
    /// Opaque function identifier, copied into the delivery log
    pub function_id: String,
    /// Opaque request identifier, copied into the delivery log
    pub request_id: String,
    /// Destination endpoint (untrusted; validated when the request is built)
    pub url: String,
    /// Request body, sent verbatim
    pub payload: String,
    /// Extra headers in send order; duplicates are allowed
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl WebhookJob {
    /// Creates a job with no extra headers.
    #[must_use]
    pub fn new(
        project_id: impl Into<String>,
        function_id: impl Into<String>,
        request_id: impl Into<String>,
        url: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            function_id: function_id.into(),
            request_id: request_id.into(),
            url: url.into(),
            payload: payload.into(),
            headers: Vec::new(),
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
