//! HTTP transport used to reach the remote evaluation service.
use std::{error::Error as StdError, sync::Arc, time::Duration};

use reqwest::{header::HeaderMap, Method, StatusCode, Url};

use crate::Result;

/// Default request timeout of [`ReqwestTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A request to be sent by a [`Transport`].
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Status and raw body of a response received by a [`Transport`].
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with the given status and body.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }
}

/// Failure to get any response from the server: DNS, connection refused, timeout, etc.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum TransportError {
    /// Error reported by `reqwest`.
    #[error(transparent)]
    Network(Arc<reqwest::Error>),

    /// Error reported by a custom transport.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Describe the error along with all its sources, e.g. `error sending request: connection
    /// refused`.
    pub fn describe(&self) -> String {
        let mut description = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            let message = err.to_string();
            if !description.ends_with(&message) {
                description.push_str(": ");
                description.push_str(&message);
            }
            source = err.source();
        }
        description
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        TransportError::Network(Arc::new(value.without_url()))
    }
}

/// Capability to perform an HTTP request.
///
/// Implementations own connection handling, timeouts and retries. A transport shared by a
/// [`Provider`](crate::Provider) may be called concurrently from several threads.
///
/// Any `Fn(HttpRequest) -> Result<HttpResponse, TransportError>` is a transport, which is handy
/// for tests:
///
/// ```
/// # use remote_flags::{HttpRequest, HttpResponse, Transport, TransportError};
/// # use reqwest::StatusCode;
/// let transport = |_request: HttpRequest| -> Result<HttpResponse, TransportError> {
///     Ok(HttpResponse::new(StatusCode::OK, r#"{"value": true}"#))
/// };
/// ```
pub trait Transport {
    /// Send `request`, returning status and body of the response.
    fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

impl<T> Transport for T
where
    T: Fn(HttpRequest) -> std::result::Result<HttpResponse, TransportError>,
{
    fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Default transport built on a blocking `reqwest` client.
///
/// Must not be used from within an async runtime context, as blocking `reqwest` would panic.
pub struct ReqwestTransport {
    // Client holds a connection pool internally, so we're reusing the client between requests.
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<ReqwestTransport> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(ReqwestTransport { client })
    }

    /// Wrap an existing client, e.g. one configured with a proxy or custom TLS.
    pub fn from_client(client: reqwest::blocking::Client) -> ReqwestTransport {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()?;

        let status = response.status();
        let body = response.bytes()?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
