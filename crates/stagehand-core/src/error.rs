//! Error types for Stagehand.
//!
//! Every failure that reaches the error-hook chain is exactly one of two kinds:
//!
//! | Kind | Cause | Message safe to expose? | Logged at error level? |
//! |---|---|---|---|
//! | [`ClientError`] | The caller's request was invalid | Yes | Never |
//! | [`ServiceError`] | Anything else (bugs, downstream failures) | No | Always, once |
//!
//! There is no runtime type inspection: the kind is the [`HandlerError`]
//! variant, fixed when the error is constructed. The only conversion that
//! inspects a foreign error is `From<anyhow::Error>`, which is the
//! classification boundary for logic that bubbles up arbitrary errors.

use crate::validation::Violation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// The `errorType` reported for client-caused errors.
pub const BAD_REQUEST_ERROR_TYPE: &str = "BadRequestError";

/// Result type alias using [`HandlerError`].
pub type HandlerResult<T> = Result<T, HandlerError>;

/// The two error kinds known to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caused by the caller; safe to describe externally.
    ClientError,
    /// Caused by the service; details must not leak.
    ServiceError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientError => f.write_str("ClientError"),
            Self::ServiceError => f.write_str("ServiceError"),
        }
    }
}

/// An error caused by the caller's input or a rejected business precondition.
///
/// The message is returned to the caller, so it should be written with that
/// audience in mind.
///
/// # Example
///
/// ```
/// use stagehand_core::{ClientError, HandlerError};
///
/// fn check_quantity(quantity: i64) -> Result<(), HandlerError> {
///     if quantity <= 0 {
///         return Err(ClientError::new("quantity must be positive").into());
///     }
///     Ok(())
/// }
///
/// let err = check_quantity(0).unwrap_err();
/// assert!(err.is_client_caused());
/// assert_eq!(err.message(), "quantity must be positive");
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
    stack_trace: String,
    violations: Vec<Violation>,
}

impl ClientError {
    /// Creates a client error raised at the caller's location.
    #[track_caller]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let stack_trace = trace_line(BAD_REQUEST_ERROR_TYPE, &message, Location::caller());
        Self {
            message,
            stack_trace,
            violations: Vec::new(),
        }
    }

    /// Attaches the schema violations that caused this error.
    #[must_use]
    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        self.violations = violations;
        self
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stack trace captured at construction.
    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    /// Returns the schema violations, if this error came from validation.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns the externally reported error type.
    pub const fn error_type(&self) -> &'static str {
        BAD_REQUEST_ERROR_TYPE
    }
}

/// An internal failure of the service.
///
/// Its message and stack trace go to the error log channel only; callers of
/// a gateway handler never see them.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    message: String,
    stack_trace: String,
    #[source]
    source: Option<anyhow::Error>,
}

impl ServiceError {
    /// Creates a service error from a plain message.
    #[track_caller]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let stack_trace = trace_line("Error", &message, Location::caller());
        Self {
            message,
            stack_trace,
            source: None,
        }
    }

    /// Creates a service error wrapping an arbitrary failure.
    ///
    /// The stack trace lists every `Caused by:` entry of the error chain.
    #[track_caller]
    pub fn from_anyhow(error: anyhow::Error) -> Self {
        let message = error.to_string();
        let mut stack_trace = trace_line("Error", &message, Location::caller());
        for cause in error.chain().skip(1) {
            stack_trace.push_str("\nCaused by: ");
            stack_trace.push_str(&cause.to_string());
        }
        Self {
            message,
            stack_trace,
            source: Some(error),
        }
    }

    /// Returns the error message (internal use only).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stack trace captured at construction.
    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }
}

/// The error type produced by handler logic and pipeline stages.
///
/// # Example
///
/// ```
/// use stagehand_core::{ErrorKind, HandlerError};
///
/// let err = HandlerError::bad_request("missing order id");
/// assert_eq!(err.kind(), ErrorKind::ClientError);
///
/// let err: HandlerError = anyhow::anyhow!("database unreachable").into();
/// assert_eq!(err.kind(), ErrorKind::ServiceError);
/// ```
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The caller is at fault.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The service is at fault.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl HandlerError {
    /// Creates a client-caused error.
    #[track_caller]
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Client(ClientError::new(message))
    }

    /// Creates a service error from a message.
    #[track_caller]
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Service(ServiceError::new(message))
    }

    /// Creates a service error from any error value.
    ///
    /// Unlike `From<anyhow::Error>`, this never yields a client error.
    #[track_caller]
    pub fn service(error: impl Into<anyhow::Error>) -> Self {
        Self::Service(ServiceError::from_anyhow(error.into()))
    }

    /// Returns the classification of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Client(_) => ErrorKind::ClientError,
            Self::Service(_) => ErrorKind::ServiceError,
        }
    }

    /// Returns `true` when the caller caused this error.
    pub const fn is_client_caused(&self) -> bool {
        matches!(self, Self::Client(_))
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        match self {
            Self::Client(err) => err.message(),
            Self::Service(err) => err.message(),
        }
    }

    /// Returns the stack trace.
    pub fn stack_trace(&self) -> &str {
        match self {
            Self::Client(err) => err.stack_trace(),
            Self::Service(err) => err.stack_trace(),
        }
    }

    /// Returns the client error, if this is one.
    pub const fn as_client(&self) -> Option<&ClientError> {
        match self {
            Self::Client(err) => Some(err),
            Self::Service(_) => None,
        }
    }
}

impl From<anyhow::Error> for HandlerError {
    #[track_caller]
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<ClientError>() {
            Ok(client) => return Self::Client(client),
            Err(error) => error,
        };
        match error.downcast::<ServiceError>() {
            Ok(service) => Self::Service(service),
            Err(error) => Self::Service(ServiceError::from_anyhow(error)),
        }
    }
}

/// Returns `true` when the error was caused by the caller.
pub const fn is_client_caused(error: &HandlerError) -> bool {
    error.is_client_caused()
}

fn trace_line(kind: &str, message: &str, location: &Location<'_>) -> String {
    format!(
        "{kind}: {message}\n    at {}:{}:{}",
        location.file(),
        location.line(),
        location.column()
    )
}
