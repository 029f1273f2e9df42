//! HTTP transport used by the [`Actor`](crate::Actor).
//!
//! The actor only needs one capability: send a request and get back either a
//! response (whatever its status) or a transport failure. [`HttpTransport`]
//! is that seam; [`ReqwestTransport`] is the blocking `reqwest` implementation
//! used by default.

use std::error::Error;
use std::fmt;
use std::io::{self, Cursor, Read};
use std::time::Duration;

use http::{HeaderMap, Method, StatusCode};
use tracing::debug;
use url::Url;

/// Sends HTTP requests on behalf of an actor.
///
/// A non-2xx response is a successful send. Only failures to produce a
/// response at all (connection refused, DNS, timeout, ...) are errors.
pub trait HttpTransport {
    /// Sends the request and waits for the response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if no response could be obtained.
    fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// A fully built request, ready to be sent.
#[derive(Clone, derive_more::Debug)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL, query included.
    pub url: Url,
    /// Request headers, default headers included.
    pub headers: HeaderMap,
    /// The serialized payload, if any.
    #[debug(ignore)]
    pub body: Option<Vec<u8>>,
}

/// A response as returned by the transport.
#[derive(Debug)]
pub struct TransportResponse {
    /// The response status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body, not read yet.
    pub body: ResponseBody,
}

/// A response body that can be read exactly once.
pub struct ResponseBody {
    reader: Box<dyn Read + Send>,
}

impl ResponseBody {
    /// Wraps a reader, typically a streaming response.
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Wraps an in-memory body.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_reader(Cursor::new(bytes.into()))
    }

    /// An empty body.
    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Reads the whole body, consuming it.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the stream fails mid-read.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody").finish_non_exhaustive()
    }
}

/// A failure to obtain any response.
#[derive(Debug)]
pub struct TransportError(Box<dyn Error + Send + Sync>);

impl TransportError {
    /// Wraps any error, or a plain message.
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self(error.into())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::new(error)
    }
}

/// The default transport, a blocking [`reqwest`] client.
///
/// Must not be used from inside an async runtime; run the server under test
/// on its own runtime thread instead.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Uses an already configured client.
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Builds a client with a total request timeout.
    ///
    /// # Errors
    ///
    /// Fails if the underlying client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Self::from_builder(reqwest::blocking::Client::builder().timeout(timeout))
    }

    /// Builds the client from a configured `reqwest` builder.
    ///
    /// # Errors
    ///
    /// Fails if the underlying client cannot be built.
    pub fn from_builder(
        builder: reqwest::blocking::ClientBuilder,
    ) -> Result<Self, TransportError> {
        let client = builder.build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder.build()?;

        debug!(?request, "sending...");
        let response = self.client.execute(request)?;
        debug!(?response, "...receiving");

        let status = response.status();
        let headers = response.headers().clone();
        Ok(TransportResponse {
            status,
            headers,
            body: ResponseBody::from_reader(response),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr, TcpListener};

    use super::*;

    #[test]
    fn test_response_body_from_bytes() {
        let body = ResponseBody::from_bytes(r#"{"name":"a"}"#);

        let bytes = body.into_bytes().expect("should read body");

        assert_eq!(bytes, br#"{"name":"a"}"#);
    }

    #[test]
    fn test_response_body_empty() {
        let bytes = ResponseBody::empty().into_bytes().expect("should read body");

        assert!(bytes.is_empty());
    }

    #[test]
    fn test_response_body_debug_hides_content() {
        let body = ResponseBody::from_bytes("secret");

        insta::assert_debug_snapshot!(body, @"ResponseBody { .. }");
    }

    #[test]
    fn test_transport_error_from_message() {
        let error = TransportError::new("connection reset by peer");

        assert_eq!(error.to_string(), "connection reset by peer");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_transport_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<TransportError>();
        assert_sync::<TransportError>();
    }

    #[test]
    fn test_reqwest_transport_build_failure_is_an_error() {
        let builder = reqwest::blocking::Client::builder().user_agent("bad\nagent");

        let result = ReqwestTransport::from_builder(builder);

        assert!(result.is_err());
    }

    #[test]
    fn test_reqwest_transport_connection_refused() {
        // grab a free port, then close it
        let listener =
            TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).expect("bind port");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let transport = ReqwestTransport::with_timeout(Duration::from_secs(5)).expect("client");
        let request = TransportRequest {
            method: Method::GET,
            url: format!("http://{addr}/status").parse().expect("valid url"),
            headers: HeaderMap::new(),
            body: None,
        };

        let result = transport.send(request);

        assert!(result.is_err());
    }
}
