//! Production HTTP client implementation using reqwest.

use std::time::Duration;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// How the client classifies responses with a non-2xx status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Every received response is returned as `Ok`, whatever its status.
    #[default]
    AcceptAll,
    /// Non-2xx responses are returned as [`HttpError::Status`].
    RejectErrorStatus,
}

/// Production HTTP client using reqwest.
///
/// A thin wrapper around `reqwest::Client` implementing [`HttpClient`].
/// Cloning is cheap and clones share one connection pool, so a single
/// instance serves every concurrent delivery.
///
/// # Wire headers
///
/// reqwest holds request headers in an [`http::HeaderMap`]. Values of a
/// repeated header are sent in their original relative order, but all of
/// them at the position of the name's first occurrence, so interleaving with
/// other names is not reproduced. The transport also adds `host`,
/// `content-length` and `accept: */*`.
///
/// # Example
///
/// ```no_run
/// use webhook_worker::delivery::{ReqwestClient, HttpClient, HttpRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new();
/// let request = HttpRequest::post_json("https://api.example.com/hook", "{}", &[])?;
/// let response = client.request(request).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    status_policy: StatusPolicy,
}

impl ReqwestClient {
    /// Creates a new HTTP client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_client(reqwest::Client::new())
    }

    /// Creates a client whose requests are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Connection`] if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Connection(Box::new(e)))?;
        Ok(Self::from_client(inner))
    }

    /// Creates an HTTP client from an existing reqwest client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self {
            inner: client,
            status_policy: StatusPolicy::AcceptAll,
        }
    }

    /// Sets how non-2xx responses are classified.
    #[must_use]
    pub const fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Returns the configured status policy.
    #[must_use]
    pub const fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.inner.request(req.method, req.url.as_str());

        // Appended into a HeaderMap: repeated names keep their relative order
        // but are grouped under the name's first position.
        for (name, value) in req.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        let response = HttpResponse::new(status, headers, body);
        match self.status_policy {
            StatusPolicy::RejectErrorStatus if !response.is_success() => {
                Err(response.into_status_error())
            }
            _ => Ok(response),
        }
    }
}

fn classify(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else {
        HttpError::Connection(Box::new(e))
    }
}
