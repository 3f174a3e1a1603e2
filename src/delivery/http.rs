//! HTTP request/response types and client trait.

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};

use super::HttpError;

/// Content type attached to every delivery.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An HTTP request to be sent.
///
/// Headers are an ordered list rather than an [`http::HeaderMap`] so that
/// the request keeps the order they were added in, including interleaved
/// duplicates. How much of that order reaches the wire depends on the
/// [`HttpClient`]; see [`ReqwestClient`](super::ReqwestClient).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: http::Method,
    /// Target URL
    pub url: url::Url,
    /// HTTP headers to send, in order
    pub headers: Vec<(HeaderName, HeaderValue)>,
    /// Optional request body
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a new HTTP request with the given method and URL.
    ///
    /// Headers are initialized to an empty list and body is `None`.
    #[must_use]
    pub const fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request to the given URL.
    #[must_use]
    pub const fn post(url: url::Url) -> Self {
        Self::new(http::Method::POST, url)
    }

    /// Builds a JSON POST from untrusted inputs.
    ///
    /// `Content-Type: application/json` comes first, followed by `headers`
    /// in the given order. No other headers are added to the request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if `url` is not an absolute URL, or
    /// [`HttpError::InvalidHeader`] if any header name or value is invalid.
    pub fn post_json<'a, I>(url: &str, body: &str, headers: I) -> Result<Self, HttpError>
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        let url = url::Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let mut request = Self::post(url)
            .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .with_body(body.as_bytes().to_vec());

        for (name, value) in headers {
            let header_name = name
                .parse::<HeaderName>()
                .map_err(|e| HttpError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            request = request.with_header(header_name, header_value);
        }

        Ok(request)
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a header. Existing headers with the same name are kept.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// An HTTP response received from a server.
///
/// The body is fully buffered into memory.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Response body (fully buffered)
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a new HTTP response.
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the body as a UTF-8 string, if valid.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn body_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns the headers as `(name, value)` string pairs.
    ///
    /// Values that are not visible ASCII are decoded lossily.
    #[must_use]
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }

    /// Converts this response into an [`HttpError::Status`].
    #[must_use]
    pub fn into_status_error(self) -> HttpError {
        HttpError::Status {
            status: self.status,
            body: self.body_text_lossy(),
            headers: self.header_pairs(),
        }
    }
}

/// Trait for making HTTP requests.
///
/// Abstracts the HTTP client so the pipeline can be driven by mock clients
/// in tests and by [`ReqwestClient`](super::ReqwestClient) in production.
///
/// # Example
///
/// ```ignore
/// use webhook_worker::delivery::{HttpClient, HttpRequest, HttpResponse, HttpError};
///
/// struct MockClient {
///     response: HttpResponse,
/// }
///
/// impl HttpClient for MockClient {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(self.response.clone())
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when no usable response was obtained:
    /// - Network connection fails ([`HttpError::Connection`])
    /// - Request times out ([`HttpError::Timeout`])
    /// - URL is invalid ([`HttpError::InvalidUrl`])
    /// - The response status was rejected ([`HttpError::Status`])
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<T: HttpClient> HttpClient for std::sync::Arc<T> {
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send {
        (**self).request(req)
    }
}
