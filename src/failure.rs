//! Request-path failure envelope.
//!
//! Failures inside the middleware chain are values, not panics: every stage
//! and handler returns an [`Outcome`], and the first `Err` travels straight
//! up to the application boundary where it is rendered as an HTML error
//! page. Startup problems use [`crate::Error`] instead; the two never mix.

use std::backtrace::Backtrace;
use std::fmt;
use std::io;

use crate::response::Response;

/// What the middleware chain produces: a response, or the failure that ended
/// request handling.
pub type Outcome = Result<Response, Failure>;

/// A failed request: human-readable message plus the call trace captured
/// where the failure was created.
#[derive(Debug, Clone)]
pub struct Failure {
    message: String,
    trace: String,
}

impl Failure {
    /// Captures the current backtrace alongside `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Builds a failure with a caller-supplied trace. The failure page is a
    /// pure function of message and trace, so embedders (and tests) can pin
    /// both down.
    pub fn with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: trace.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

impl From<io::Error> for Failure {
    fn from(e: io::Error) -> Self {
        Self::new(format!("io: {e}"))
    }
}
