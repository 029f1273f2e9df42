use std::io;

use http::StatusCode;

use crate::transport::TransportError;

/// Everything that can go wrong while an [`Actor`](crate::Actor) sends a request
/// or checks a response.
///
/// These never reach test code as values: the actor turns each one into a
/// fatal failure through its [`FailureReporter`](crate::FailureReporter), using
/// the `Display` output as the message.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ActorError {
    /// The base URL and endpoint do not form a valid URL.
    #[display("create request: invalid url '{url}': {error}")]
    #[from(skip)]
    UrlError {
        /// The concatenated URL.
        url: String,
        /// The parse failure.
        error: url::ParseError,
    },

    /// A default header has an invalid name.
    #[display("create request: {_0}")]
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// A default header has an invalid value.
    #[display("create request: {_0}")]
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// Query parameters cannot be URL-encoded.
    #[display("create request: {_0}")]
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// The request body cannot be serialized to JSON.
    #[display("json marshal: {_0}")]
    SerializationError(serde_json::Error),

    /// The transport could not produce a response.
    #[display("make request: {_0}")]
    TransportError(TransportError),

    /// An assertion was called before any request was sent.
    #[display("no response: send a request before checking the response")]
    #[from(skip)]
    NoResponse,

    /// The body of the last response was already read by a previous step.
    #[display("response body already consumed by a previous assertion")]
    #[from(skip)]
    BodyConsumed,

    /// The response body could not be read.
    #[display("cannot read response: {error}")]
    #[from(skip)]
    BodyReadError {
        /// The I/O failure.
        error: io::Error,
    },

    /// The response body is not the expected JSON.
    #[display("unmarshal json response at '{path}': {error}\n{body}")]
    #[from(skip)]
    JsonError {
        /// Where in the document deserialization failed.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
        /// The raw response body.
        body: String,
    },

    /// The response body is not valid UTF-8 text.
    #[display("cannot read response as text: {error}")]
    #[from(skip)]
    NotText {
        /// The decoding failure.
        error: std::string::FromUtf8Error,
    },

    /// The status code differs from the expected one.
    #[display("expected response code is {} got {}", expected.as_u16(), actual.as_u16())]
    #[from(skip)]
    UnexpectedStatusCode {
        /// The expected status.
        expected: StatusCode,
        /// The received status.
        actual: StatusCode,
    },

    /// The status code is the one that should not be seen.
    #[display("expected response code is not {} got {}", unexpected.as_u16(), actual.as_u16())]
    #[from(skip)]
    ForbiddenStatusCode {
        /// The status that should not be seen.
        unexpected: StatusCode,
        /// The received status.
        actual: StatusCode,
    },

    /// The JSON body differs from the expected document.
    #[display("expected response contain {expected} got {actual}")]
    #[from(skip)]
    JsonMismatch {
        /// The expected document.
        expected: serde_json::Value,
        /// The received document.
        actual: serde_json::Value,
    },

    /// The raw body differs from the expected text.
    #[display("expected response equals {expected:?} got {actual:?}")]
    #[from(skip)]
    BodyMismatch {
        /// The expected body.
        expected: String,
        /// The received body.
        actual: String,
    },
}
