use std::time::Duration;

use indexmap::IndexMap;

use super::Actor;
use crate::reporter::{FailureReporter, PanicReporter};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Builder for creating [`Actor`] instances.
///
/// # Default Configuration
///
/// - **Base URL**: `http://127.0.0.1`
/// - **Headers**: none
/// - **Timeout**: none (the `reqwest` default)
/// - **Transport**: [`ReqwestTransport`]
/// - **Reporter**: [`PanicReporter`]
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use codeception_core::Actor;
///
/// let actor = Actor::builder()
///     .with_base_url("http://localhost:8080/api")
///     .with_header("Accept", "application/json")
///     .with_header("Authorization", "Bearer token")
///     .with_timeout(Duration::from_secs(5))
///     .build();
///
/// assert_eq!(actor.base_url(), "http://localhost:8080/api");
/// ```
#[derive(derive_more::Debug)]
pub struct ActorBuilder {
    base_url: String,
    headers: IndexMap<String, String>,
    timeout: Option<Duration>,
    #[debug(ignore)]
    transport: Option<Box<dyn HttpTransport>>,
    #[debug(ignore)]
    reporter: Box<dyn FailureReporter>,
}

impl ActorBuilder {
    /// Builds the actor.
    ///
    /// If the HTTP client cannot be created, the failure is reported through
    /// the configured reporter.
    pub fn build(self) -> Actor {
        let Self {
            base_url,
            headers,
            timeout,
            transport,
            reporter,
        } = self;

        let transport: Box<dyn HttpTransport> = match transport {
            Some(transport) => transport,
            None => {
                let mut client = reqwest::blocking::Client::builder();
                if let Some(timeout) = timeout {
                    client = client.timeout(timeout);
                }
                match ReqwestTransport::from_builder(client) {
                    Ok(transport) => Box::new(transport),
                    Err(error) => reporter.fatal(&format!("create client: {error}")),
                }
            }
        };

        Actor {
            base_url,
            headers,
            transport,
            reporter,
            last_response: None,
        }
    }

    /// Sets the URL every endpoint is appended to.
    ///
    /// The endpoint is concatenated as is, so the base URL usually has no
    /// trailing slash and endpoints start with one. The result is then parsed
    /// as a URL, which resolves `.` and `..` path segments.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds several headers sent with every request.
    pub fn with_headers<H, K, V>(mut self, headers: H) -> Self
    where
        H: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        self
    }

    /// Sets a total timeout for each request of the default transport.
    ///
    /// Ignored when a custom transport is set.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the default `reqwest` transport.
    pub fn with_transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Replaces the default [`PanicReporter`].
    pub fn with_reporter(mut self, reporter: impl FailureReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }
}

impl Default for ActorBuilder {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1"),
            headers: IndexMap::new(),
            timeout: None,
            transport: None,
            reporter: Box::new(PanicReporter),
        }
    }
}
