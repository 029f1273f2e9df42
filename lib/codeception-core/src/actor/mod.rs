use headers::{ContentType, HeaderMapExt};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::reporter::FailureReporter;
use crate::transport::{HttpTransport, TransportRequest};

mod builder;
pub use self::builder::ActorBuilder;

mod error;
pub use self::error::ActorError;

mod query;
pub use self::query::QueryParams;

mod response;
use self::response::LastResponse;


/// A chainable driver for one HTTP conversation in a test.
///
/// The actor sends requests against a base URL and checks the last response.
/// Every operation returns the actor, so a scenario reads as one expression.
/// Any failure (invalid request, network error, unexpected status, wrong JSON)
/// is reported through the actor's [`FailureReporter`] and stops the test
/// right there: nothing is returned to the test code to inspect.
///
/// # Example
///
/// ```rust,no_run
/// use codeception_core::{Actor, PanicReporter, QueryParams, StatusCode};
/// use serde_json::json;
///
/// let mut actor = Actor::new(
///     PanicReporter,
///     "http://localhost:8080",
///     [("Accept", "application/json")],
/// );
///
/// actor
///     .send_get("/status", QueryParams::new())
///     .see_response_code_is(StatusCode::FORBIDDEN)
///     .dont_see_response_code_is(StatusCode::OK);
///
/// actor
///     .send_post("/echo", &json!({"name": "a"}))
///     .see_response_code_is(StatusCode::OK)
///     .see_json(&json!({"name": "a"}));
/// ```
///
/// # Response body
///
/// The body of the last response can be read once. Call at most one of
/// [`see_json`](Self::see_json), [`see_response_equals`](Self::see_response_equals),
/// [`grab_response`](Self::grab_response) or [`grab_json`](Self::grab_json)
/// per request; a second one fails with [`ActorError::BodyConsumed`].
///
/// # JSON equality
///
/// [`see_json`](Self::see_json) compares [`serde_json::Value`]s: object key
/// order is ignored, integers compare by value, but an integer never equals a
/// float (`1` and `1.0` differ).
#[derive(derive_more::Debug)]
pub struct Actor {
    base_url: String,
    headers: IndexMap<String, String>,
    #[debug(ignore)]
    transport: Box<dyn HttpTransport>,
    #[debug(ignore)]
    reporter: Box<dyn FailureReporter>,
    last_response: Option<LastResponse>,
}

// Create
impl Actor {
    /// Creates an actor with the default blocking `reqwest` transport.
    ///
    /// Nothing is validated here: a malformed URL or header is reported when
    /// the first request is built.
    pub fn new<H, K, V>(
        reporter: impl FailureReporter + 'static,
        base_url: impl Into<String>,
        headers: H,
    ) -> Self
    where
        H: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ActorBuilder::default()
            .with_reporter(reporter)
            .with_base_url(base_url)
            .with_headers(headers)
            .build()
    }

    /// Starts configuring an actor.
    pub fn builder() -> ActorBuilder {
        ActorBuilder::default()
    }

    /// The URL every endpoint is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// Send
impl Actor {
    /// Sends a `GET` request with the given query parameters.
    pub fn send_get(&mut self, endpoint: &str, query: impl Into<QueryParams>) -> &mut Self {
        let result = self.send(Method::GET, endpoint, &query.into(), None);
        self.ensure(result);
        self
    }

    /// Sends a `POST` request with `body` serialized as JSON.
    pub fn send_post(&mut self, endpoint: &str, body: &(impl Serialize + ?Sized)) -> &mut Self {
        let result = self.send_json(Method::POST, endpoint, body);
        self.ensure(result);
        self
    }

    /// Sends a `PATCH` request with `body` serialized as JSON.
    pub fn send_patch(&mut self, endpoint: &str, body: &(impl Serialize + ?Sized)) -> &mut Self {
        let result = self.send_json(Method::PATCH, endpoint, body);
        self.ensure(result);
        self
    }

    /// Sends a `PUT` request with `body` serialized as JSON.
    pub fn send_put(&mut self, endpoint: &str, body: &(impl Serialize + ?Sized)) -> &mut Self {
        let result = self.send_json(Method::PUT, endpoint, body);
        self.ensure(result);
        self
    }

    /// Sends a `DELETE` request with the given query parameters.
    pub fn send_delete(&mut self, endpoint: &str, query: impl Into<QueryParams>) -> &mut Self {
        let result = self.send(Method::DELETE, endpoint, &query.into(), None);
        self.ensure(result);
        self
    }

    /// Sets a header sent with every following request.
    ///
    /// Replaces any header with the same name, ignoring ASCII case.
    pub fn have_http_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let name = name.into();
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// Stops sending a header, ignoring ASCII case.
    pub fn delete_http_header(&mut self, name: &str) -> &mut Self {
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self
    }

    fn send_json(
        &mut self,
        method: Method,
        endpoint: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<(), ActorError> {
        let body = serde_json::to_vec(body).map_err(ActorError::SerializationError)?;
        self.send(method, endpoint, &QueryParams::default(), Some(body))
    }

    fn send(
        &mut self,
        method: Method,
        endpoint: &str,
        query: &QueryParams,
        body: Option<Vec<u8>>,
    ) -> Result<(), ActorError> {
        let request = self.build_request(method, endpoint, query, body)?;
        let response = self.transport.send(request)?;
        debug!(status = %response.status, headers = ?response.headers, "response captured");

        self.last_response = Some(LastResponse::from(response));
        Ok(())
    }

    fn build_request(
        &self,
        method: Method,
        endpoint: &str,
        query: &QueryParams,
        body: Option<Vec<u8>>,
    ) -> Result<TransportRequest, ActorError> {
        let url = self.build_url(endpoint, query)?;

        let mut headers = HeaderMap::new();
        if body.is_some() {
            headers.typed_insert(ContentType::json());
        }
        for (name, value) in &self.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        Ok(TransportRequest {
            method,
            url,
            headers,
            body,
        })
    }

    fn build_url(&self, endpoint: &str, query: &QueryParams) -> Result<Url, ActorError> {
        let url = format!("{}{endpoint}", self.base_url);
        let mut url = Url::parse(&url).map_err(|error| ActorError::UrlError { url, error })?;
        query.append_to(&mut url)?;
        Ok(url)
    }
}

// See
impl Actor {
    /// Checks that the last response has the `expected` status code.
    pub fn see_response_code_is(&mut self, expected: StatusCode) -> &mut Self {
        let result = self.check_status(expected);
        self.ensure(result);
        self
    }

    /// Checks that the last response does not have the `unexpected` status code.
    pub fn dont_see_response_code_is(&mut self, unexpected: StatusCode) -> &mut Self {
        let result = self.check_not_status(unexpected);
        self.ensure(result);
        self
    }

    /// Checks that the last response body is a JSON object equal to `expected`.
    ///
    /// Consumes the response body.
    pub fn see_json(&mut self, expected: &(impl Serialize + ?Sized)) -> &mut Self {
        let result = self.check_json(expected);
        self.ensure(result);
        self
    }

    /// Checks that the last response body is exactly `expected`.
    ///
    /// Consumes the response body.
    pub fn see_response_equals(&mut self, expected: &str) -> &mut Self {
        let result = self.check_body(expected);
        self.ensure(result);
        self
    }

    fn check_status(&self, expected: StatusCode) -> Result<(), ActorError> {
        let actual = self.response()?.status();
        if actual != expected {
            return Err(ActorError::UnexpectedStatusCode { expected, actual });
        }
        Ok(())
    }

    fn check_not_status(&self, unexpected: StatusCode) -> Result<(), ActorError> {
        let actual = self.response()?.status();
        if actual == unexpected {
            return Err(ActorError::ForbiddenStatusCode { unexpected, actual });
        }
        Ok(())
    }

    fn check_json(&mut self, expected: &(impl Serialize + ?Sized)) -> Result<(), ActorError> {
        let expected = serde_json::to_value(expected).map_err(ActorError::SerializationError)?;
        let actual = Value::Object(self.read_json::<Map<String, Value>>()?);
        if actual != expected {
            return Err(ActorError::JsonMismatch { expected, actual });
        }
        Ok(())
    }

    fn check_body(&mut self, expected: &str) -> Result<(), ActorError> {
        let actual = self.response_mut()?.take_text()?;
        if actual != expected {
            return Err(ActorError::BodyMismatch {
                expected: expected.to_owned(),
                actual,
            });
        }
        Ok(())
    }
}

// Grab
impl Actor {
    /// Returns the status code of the last response.
    pub fn grab_response_code(&self) -> StatusCode {
        let result = self.response().map(LastResponse::status);
        self.ensure(result)
    }

    /// Returns the last response body as text.
    ///
    /// Consumes the response body.
    pub fn grab_response(&mut self) -> String {
        let result = self.response_mut().and_then(LastResponse::take_text);
        self.ensure(result)
    }

    /// Deserializes the last response body from JSON.
    ///
    /// Consumes the response body.
    pub fn grab_json<T>(&mut self) -> T
    where
        T: DeserializeOwned,
    {
        let result = self.read_json();
        self.ensure(result)
    }
}

impl Actor {
    fn response(&self) -> Result<&LastResponse, ActorError> {
        self.last_response.as_ref().ok_or(ActorError::NoResponse)
    }

    fn response_mut(&mut self) -> Result<&mut LastResponse, ActorError> {
        self.last_response.as_mut().ok_or(ActorError::NoResponse)
    }

    fn read_json<T>(&mut self) -> Result<T, ActorError>
    where
        T: DeserializeOwned,
    {
        let body = self.response_mut()?.take_body()?;
        let json_error = |path: String, error| ActorError::JsonError {
            path,
            error,
            body: String::from_utf8_lossy(&body).into_owned(),
        };

        let mut deserializer = serde_json::Deserializer::from_slice(&body);
        let result = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| json_error(err.path().to_string(), err.into_inner()))?;
        deserializer
            .end()
            .map_err(|error| json_error(String::from("."), error))?;

        Ok(result)
    }

    /// Unwraps the result or aborts the test.
    fn ensure<T>(&self, result: Result<T, ActorError>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.reporter.fatal(&error.to_string()),
        }
    }
}
