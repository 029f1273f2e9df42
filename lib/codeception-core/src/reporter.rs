//! Fail-fast reporting for actor failures.
//!
//! Every failure detected by an [`Actor`](crate::Actor) goes through a single
//! [`FailureReporter::fatal`] call that never returns. The default
//! [`PanicReporter`] fails the current Rust test. The [`RecordingReporter`]
//! keeps the message and unwinds with a [`FatalFailure`] payload that
//! [`catch_fatal`] turns back into a value, so the actor itself can be tested.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

/// Reports a fatal failure and aborts the current test.
///
/// Implementations must not return control to the caller.
pub trait FailureReporter {
    /// Aborts the current test with the given message.
    fn fatal(&self, message: &str) -> !;
}

/// Reports failures by panicking, which fails the running `#[test]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
    fn fatal(&self, message: &str) -> ! {
        error!(%message, "fatal failure");
        panic!("{message}");
    }
}

/// The unwind payload raised by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{message}")]
pub struct FatalFailure {
    message: String,
}

impl FatalFailure {
    /// The reported message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A test double that records every reported message.
///
/// Clones share the same log, so a clone can be handed to the actor while
/// the test keeps another one to inspect.
///
/// # Example
///
/// ```rust
/// use codeception_core::{Actor, RecordingReporter, StatusCode, catch_fatal};
///
/// let reporter = RecordingReporter::default();
/// let mut actor = Actor::builder()
///     .with_reporter(reporter.clone())
///     .build();
///
/// let failure = catch_fatal(|| {
///     actor.see_response_code_is(StatusCode::OK);
/// })
/// .unwrap_err();
///
/// assert!(failure.message().starts_with("no response"));
/// assert_eq!(reporter.messages().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    /// All messages reported so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl FailureReporter for RecordingReporter {
    fn fatal(&self, message: &str) -> ! {
        error!(%message, "fatal failure recorded");
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());

        // resume_unwind skips the panic hook, the test output stays quiet
        panic::resume_unwind(Box::new(FatalFailure {
            message: message.to_owned(),
        }))
    }
}

/// Runs `step`, capturing a fatal failure raised by a [`RecordingReporter`].
///
/// Any other panic is propagated unchanged.
///
/// # Errors
///
/// Returns the [`FatalFailure`] if `step` reported one.
pub fn catch_fatal<R>(step: impl FnOnce() -> R) -> Result<R, FatalFailure> {
    match panic::catch_unwind(AssertUnwindSafe(step)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<FatalFailure>() {
            Ok(failure) => Err(*failure),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}
