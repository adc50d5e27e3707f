//! Transient fault classification.
//!
//! Classification is two-staged:
//!
//! 1. **Cause extraction**: walk the failure's cause chain top-down and pick
//!    the first [`Error`] whose kind matches the classifier's origin.
//! 2. **Status membership**: the matched cause is transient only if it
//!    carries an HTTP status in [`RETRYABLE_STATUS_CODES`].
//!
//! A chain without a matching cause, or a cause without a status, is
//! permanent. New kinds of remote call get a new [`FaultOrigin`] variant; the
//! retry engine itself never changes.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::error::{Error, ErrorKind};

/// HTTP status codes that indicate a condition worth retrying.
///
/// Request Timeout, Too Many Requests and the transient 5xx family.
pub const RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Returns `true` if a response with this status may succeed when retried.
///
/// Every classifier shares this one membership test.
///
/// ```rust
/// use cloudmedia::retry::is_retryable_status;
///
/// assert!(is_retryable_status(503));
/// assert!(!is_retryable_status(404));
/// ```
#[inline]
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUS_CODES.contains(&status)
}

/// Verdict on an observed failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultClassification {
    /// Expected to succeed if retried (timeouts, throttling, transient server errors).
    Transient,
    /// Retrying will not help.
    Permanent,
}

impl FaultClassification {
    /// Returns `true` for [`FaultClassification::Transient`].
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, FaultClassification::Transient)
    }
}

/// Strategy deciding whether a failure is transient.
///
/// Implemented by [`OriginClassifier`] and [`AnyOf`], and by any
/// `Fn(&(dyn Error + 'static)) -> FaultClassification` closure.
pub trait FaultClassifier: Send + Sync {
    /// Classifies a failure, inspecting its whole cause chain.
    fn classify(&self, failure: &(dyn StdError + 'static)) -> FaultClassification;
}

impl<F> FaultClassifier for F
where
    F: Fn(&(dyn StdError + 'static)) -> FaultClassification + Send + Sync,
{
    fn classify(&self, failure: &(dyn StdError + 'static)) -> FaultClassification {
        self(failure)
    }
}

/// Finds the first [`Error`] of the given kind in a cause chain.
///
/// The failure itself is inspected first, then each `source()` in turn.
pub fn find_cause<'a>(failure: &'a (dyn StdError + 'static), kind: ErrorKind) -> Option<&'a Error> {
    let mut current = Some(failure);
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<Error>().filter(|e| e.kind() == kind) {
            return Some(found);
        }
        current = err.source();
    }
    None
}

/// The kind of remote call a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultOrigin {
    /// Query execution against a resource collection.
    Query,
    /// Commit of a save transaction.
    Save,
    /// Raw transport call.
    Transport,
}

impl FaultOrigin {
    /// The error kind a cause of this origin carries.
    pub fn cause_kind(&self) -> ErrorKind {
        match self {
            FaultOrigin::Query => ErrorKind::QueryExecution,
            FaultOrigin::Save => ErrorKind::SaveExecution,
            FaultOrigin::Transport => ErrorKind::Transport,
        }
    }
}

/// Classifies failures of one origin by their status code.
///
/// ```rust
/// use cloudmedia::Error;
/// use cloudmedia::retry::{FaultClassification, FaultClassifier, OriginClassifier};
///
/// let throttled = Error::query_execution("list assets").with_status(429);
/// assert_eq!(
///     OriginClassifier::query().classify(&throttled),
///     FaultClassification::Transient,
/// );
/// assert_eq!(
///     OriginClassifier::save().classify(&throttled),
///     FaultClassification::Permanent,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginClassifier {
    origin: FaultOrigin,
}

impl OriginClassifier {
    /// Creates a classifier for the given origin.
    pub const fn new(origin: FaultOrigin) -> Self {
        Self { origin }
    }

    /// Classifier for query execution failures.
    pub const fn query() -> Self {
        Self::new(FaultOrigin::Query)
    }

    /// Classifier for save execution failures.
    pub const fn save() -> Self {
        Self::new(FaultOrigin::Save)
    }

    /// Classifier for raw transport failures.
    pub const fn transport() -> Self {
        Self::new(FaultOrigin::Transport)
    }

    /// Returns the origin this classifier matches.
    pub fn origin(&self) -> FaultOrigin {
        self.origin
    }
}

impl FaultClassifier for OriginClassifier {
    fn classify(&self, failure: &(dyn StdError + 'static)) -> FaultClassification {
        match find_cause(failure, self.origin.cause_kind()).and_then(Error::status_code) {
            Some(status) if is_retryable_status(status) => FaultClassification::Transient,
            _ => FaultClassification::Permanent,
        }
    }
}

/// Transient if any member classifier says so.
#[derive(Clone, Default)]
pub struct AnyOf {
    members: Vec<Arc<dyn FaultClassifier>>,
}

impl AnyOf {
    /// Creates an empty combinator, which classifies everything as permanent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member classifier.
    #[must_use]
    pub fn or(mut self, classifier: impl FaultClassifier + 'static) -> Self {
        self.members.push(Arc::new(classifier));
        self
    }
}

impl std::fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyOf")
            .field("members", &self.members.len())
            .finish()
    }
}

impl FaultClassifier for AnyOf {
    fn classify(&self, failure: &(dyn StdError + 'static)) -> FaultClassification {
        if self
            .members
            .iter()
            .any(|c| c.classify(failure).is_transient())
        {
            FaultClassification::Transient
        } else {
            FaultClassification::Permanent
        }
    }
}
