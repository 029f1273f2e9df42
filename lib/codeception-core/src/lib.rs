//! # Codeception Core
//!
//! Write black-box HTTP acceptance tests as readable, chainable scripts.
//!
//! An [`Actor`] sends requests against a base URL and checks the last
//! response. Every step returns the actor, and the first step that fails
//! stops the test: there is no error value to handle in test code.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codeception_core::{Actor, PanicReporter, QueryParams, StatusCode};
//! use serde_json::json;
//!
//! #[test]
//! fn create_user() {
//!     let mut actor = Actor::new(PanicReporter, "http://localhost:8080", [("Accept", "application/json")]);
//!
//!     actor
//!         .send_post("/users", &json!({"name": "alice"}))
//!         .see_response_code_is(StatusCode::CREATED)
//!         .see_json(&json!({"id": 1, "name": "alice"}));
//!
//!     actor
//!         .send_get("/users", QueryParams::new().add_param("page", 1))
//!         .see_response_code_is(StatusCode::OK)
//!         .dont_see_response_code_is(StatusCode::NOT_FOUND);
//! }
//! ```
//!
//! ## Failures
//!
//! Every failure, whether the request cannot be built, the server is
//! unreachable, the body is not JSON or an expectation does not hold, is
//! reported through a [`FailureReporter`]:
//!
//! - [`PanicReporter`] (the default) panics, failing the current `#[test]`.
//! - [`RecordingReporter`] records the message and unwinds; wrap the steps in
//!   [`catch_fatal`] to observe the failure instead of failing the test.
//!
//! ## Transport
//!
//! Requests go through an [`HttpTransport`]. The default [`ReqwestTransport`]
//! is a blocking `reqwest` client, so an actor must not be driven from inside
//! an async runtime. Start the server under test on its own runtime thread.

mod actor;
pub use self::actor::{Actor, ActorBuilder, ActorError, QueryParams};

mod reporter;
pub use self::reporter::{
    FailureReporter, FatalFailure, PanicReporter, RecordingReporter, catch_fatal,
};

mod transport;
pub use self::transport::{
    HttpTransport, ReqwestTransport, ResponseBody, TransportError, TransportRequest,
    TransportResponse,
};

pub use http::StatusCode;
