//! Error kind enumeration for categorizing client errors.

/// Categorization of client errors.
///
/// Kinds fall into two groups. *Terminal* kinds are what a caller of a
/// collection or workflow operation finally sees. *Origin* kinds describe a
/// raw failure reported by a collaborator; they show up as the `source()` of a
/// terminal error and are what fault classifiers look for in the cause chain.
///
/// | ErrorKind         | Group    | Retried | Meaning                              |
/// |-------------------|----------|---------|--------------------------------------|
/// | `InvalidArgument` | terminal | No      | Precondition violated, fix the input |
/// | `InvalidState`    | terminal | No      | Object already consumed or detached  |
/// | `PermanentRemote` | terminal | No      | Remote failure classified permanent  |
/// | `RetryExhausted`  | terminal | -       | Transient failure outlived budget    |
/// | `Cancelled`       | terminal | No      | Caller abandoned the retry loop      |
/// | `Transport`       | origin   | -       | Transport adapter failure            |
/// | `QueryExecution`  | origin   | -       | Query collaborator failure           |
/// | `SaveExecution`   | origin   | -       | Save collaborator failure            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Invalid argument passed to an operation.
    ///
    /// Raised synchronously before any remote call is attempted.
    ///
    /// **Not retriable.** Fix the input and retry.
    #[error("invalid argument")]
    InvalidArgument,

    /// Operation attempted on an object in a terminal or unusable state,
    /// such as a committed transaction or an entity whose context is gone.
    #[error("invalid state")]
    InvalidState,

    /// Remote failure classified as permanent (or of unknown cause).
    ///
    /// Surfaced on the first occurrence; the original failure is the source.
    #[error("permanent remote failure")]
    PermanentRemote,

    /// A transient remote failure persisted past the attempt budget.
    ///
    /// The last observed failure is the source.
    #[error("retries exhausted")]
    RetryExhausted,

    /// The caller cancelled the operation between attempts.
    #[error("cancelled")]
    Cancelled,

    /// Failure reported by the transport adapter.
    ///
    /// Usually carries the HTTP status of the response.
    #[error("transport error")]
    Transport,

    /// Failure while executing a query against a resource collection.
    #[error("query execution failed")]
    QueryExecution,

    /// Failure while committing a save transaction.
    #[error("save execution failed")]
    SaveExecution,

    /// Requested entity does not exist.
    #[error("not found")]
    NotFound,

    /// Response from a collaborator could not be interpreted.
    #[error("invalid response")]
    InvalidResponse,

    /// Configuration error (invalid URL, missing transport).
    #[error("configuration error")]
    Configuration,
}

impl ErrorKind {
    /// Returns `true` for kinds describing a raw collaborator failure.
    ///
    /// Origin kinds are what the retry engine classifies; everything else is
    /// a local or already-terminal condition and passes through unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloudmedia::ErrorKind;
    ///
    /// assert!(ErrorKind::SaveExecution.is_origin());
    /// assert!(!ErrorKind::InvalidArgument.is_origin());
    /// ```
    #[inline]
    pub fn is_origin(&self) -> bool {
        matches!(
            self,
            ErrorKind::Transport
                | ErrorKind::QueryExecution
                | ErrorKind::SaveExecution
                | ErrorKind::InvalidResponse
                | ErrorKind::NotFound
        )
    }

    /// Returns `true` if the failure happened before any remote call.
    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidArgument | ErrorKind::InvalidState | ErrorKind::Configuration
        )
    }
}
