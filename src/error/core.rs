//! Main error type for the cloudmedia client.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use super::ErrorKind;

/// The primary error type for cloudmedia operations.
///
/// `Error` keeps the full cause chain so that callers, logs and fault
/// classifiers can reach the root condition:
/// - [`kind()`](Error::kind): Categorization for `match` statements
/// - [`status_code()`](Error::status_code): HTTP status of the failed call, if any
/// - [`source()`](StdError::source): The wrapped failure
///
/// ## Error Hierarchy
///
/// A permanently failing locator commit surfaces as:
///
/// ```text
/// Error { kind: PermanentRemote }
/// └── Error { kind: SaveExecution, status_code: Some(400) }
///     └── Error { kind: Transport, status_code: Some(400) }
/// ```
///
/// ## Example
///
/// ```rust
/// use cloudmedia::{Error, ErrorKind};
///
/// fn describe(err: &Error) -> &'static str {
///     match err.kind() {
///         ErrorKind::InvalidArgument => "fix the input",
///         ErrorKind::RetryExhausted => "service kept failing, try later",
///         ErrorKind::PermanentRemote => "service rejected the request",
///         _ => "unexpected failure",
///     }
/// }
///
/// let err = Error::invalid_argument("asset has no identity");
/// assert_eq!(describe(&err), "fix the input");
/// ```
#[derive(Debug)]
pub struct Error {
    /// The error category.
    kind: ErrorKind,

    /// Human-readable error message.
    message: Cow<'static, str>,

    /// HTTP status code reported by the remote call, if any.
    status_code: Option<u16>,

    /// The underlying error, if any.
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloudmedia::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::InvalidArgument, "relation 'Asset' given twice");
    /// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            source: None,
        }
    }

    /// Creates an error from a kind with a default message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        let message = match kind {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::PermanentRemote => "remote call failed permanently",
            ErrorKind::RetryExhausted => "remote call kept failing transiently",
            ErrorKind::Cancelled => "operation cancelled",
            ErrorKind::Transport => "transport failure",
            ErrorKind::QueryExecution => "query execution failed",
            ErrorKind::SaveExecution => "save execution failed",
            ErrorKind::NotFound => "entity not found",
            ErrorKind::InvalidResponse => "invalid response",
            ErrorKind::Configuration => "configuration error",
        };
        Self::new(kind, message)
    }

    /// Returns the error kind for categorization.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status code attached to this error, if any.
    #[inline]
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Sets the HTTP status code for this error.
    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Sets the source error for this error.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Wraps `self` as the source of a new error of the given kind.
    ///
    /// The message of the wrapped error is carried over so the outer
    /// `Display` still says what went wrong.
    #[must_use]
    pub fn wrap(self, kind: ErrorKind) -> Self {
        let message = self.message.clone();
        Error::new(kind, message).with_source(self)
    }

    // Convenience constructors for common error types

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Creates an invalid state error.
    pub fn invalid_state(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Creates a transport error with an optional HTTP status.
    pub fn transport(message: impl Into<Cow<'static, str>>, status_code: Option<u16>) -> Self {
        Self {
            status_code,
            ..Self::new(ErrorKind::Transport, message)
        }
    }

    /// Creates a query execution error.
    pub fn query_execution(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::QueryExecution, message)
    }

    /// Creates a save execution error.
    pub fn save_execution(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::SaveExecution, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a cancelled error.
    pub fn cancelled() -> Self {
        Self::from_kind(ErrorKind::Cancelled)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;

        if let Some(status) = self.status_code {
            write!(f, " (status: {})", status)?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// Implement From for common error types

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::configuration(format!("invalid URL: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorKind::InvalidResponse, format!("JSON error: {}", err)).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_new() {
        let err = Error::new(ErrorKind::InvalidArgument, "test message");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("test message"));
        assert!(err.status_code().is_none());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_error_from_kind() {
        let err = Error::from_kind(ErrorKind::RetryExhausted);
        assert_eq!(err.kind(), ErrorKind::RetryExhausted);
        assert!(err.to_string().contains("transiently"));
    }

    #[test]
    fn test_transport_carries_status() {
        let err = Error::transport("bad gateway", Some(502));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status_code(), Some(502));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_wrap_preserves_chain() {
        let root = Error::transport("throttled", Some(429));
        let save = Error::save_execution("commit failed")
            .with_status(429)
            .with_source(root);
        let outer = save.wrap(ErrorKind::RetryExhausted);

        assert_eq!(outer.kind(), ErrorKind::RetryExhausted);
        assert_eq!(outer.message(), "commit failed");

        let first = outer
            .source()
            .and_then(|e| e.downcast_ref::<Error>())
            .expect("save cause");
        assert_eq!(first.kind(), ErrorKind::SaveExecution);

        let second = first
            .source()
            .and_then(|e| e.downcast_ref::<Error>())
            .expect("transport cause");
        assert_eq!(second.status_code(), Some(429));
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(Error::invalid_argument("x").kind(), ErrorKind::InvalidArgument);
        assert_eq!(Error::invalid_state("x").kind(), ErrorKind::InvalidState);
        assert_eq!(Error::query_execution("x").kind(), ErrorKind::QueryExecution);
        assert_eq!(Error::save_execution("x").kind(), ErrorKind::SaveExecution);
        assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(Error::cancelled().kind(), ErrorKind::Cancelled);
        assert_eq!(Error::configuration("x").kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_url_error() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
