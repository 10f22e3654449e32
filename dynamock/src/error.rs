// vim: tw=80
//! Error types

use thiserror::Error;

use crate::verify::Report;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong while dispatching or verifying mock calls.
#[derive(Debug, Error)]
pub enum MockError {
    /// The method was never declared on this handle.
    #[error("{handle}: unexpected call to {method}")]
    UnexpectedCall { handle: String, method: String },

    /// The method was declared, but none of its expectations accepts the
    /// arguments.
    #[error("{handle}: no matching expectation for {method}{args}; tried:\n{}",
        .tried.join("\n"))]
    NoMatchingExpectation {
        handle: String,
        method: String,
        args: String,
        tried: Vec<String>,
    },

    /// Teardown found call counts outside their declared ranges.
    #[error("{0}")]
    VerificationFailed(Report),

    /// A return policy failed on purpose.  Propagated as-is.
    #[error(transparent)]
    User(BoxError),

    #[error("{handle}: {method} called after teardown began")]
    Closed { handle: String, method: String },

    /// A return policy or `withf` closure called back into its own
    /// expectation.
    #[error("{handle}: {method} re-entered its own expectation")]
    Reentrant { handle: String, method: String },

    #[error("{handle}: {method} was expected only once and already returned")]
    Expired { handle: String, method: String },

    #[error("{method}: return value should be {expected} but is {actual}")]
    ReturnType {
        method: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{method}: argument {index} should be {expected} but is {actual}")]
    ArgumentType {
        method: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{method}: expected {expected} argument(s), got {actual}")]
    Arity { method: String, expected: usize, actual: usize },

    #[error("factory {0} is already intercepted by another scope")]
    AlreadyIntercepted(String),
}

impl MockError {
    /// Wrap an error raised by a return policy, to simulate a failing
    /// collaborator.
    pub fn user<E>(e: E) -> Self
        where E: Into<BoxError>
    {
        MockError::User(e.into())
    }

    /// The verification report, if this is a verification failure.
    pub fn report(&self) -> Option<&Report> {
        match self {
            MockError::VerificationFailed(r) => Some(r),
            _ => None
        }
    }
}
