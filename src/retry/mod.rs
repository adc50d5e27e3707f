//! Transient-fault handling for remote calls.
//!
//! - [`FaultClassifier`]: decides whether a failure is worth retrying
//! - [`RetryPolicy`]: runs an operation under a classifier and backoff schedule
//! - [`CancellationToken`]: abandons a retry loop between attempts
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudmedia::retry::{CancellationToken, RetryPolicy};
//!
//! let policy = RetryPolicy::for_saves(RetryConfig::default());
//! let token = CancellationToken::new();
//! let results = policy
//!     .execute_with_cancel(|| executor.save(&batch), &token)
//!     .await?;
//! ```

mod cancel;
mod classifier;
mod policy;

pub use cancel::CancellationToken;
pub use classifier::{
    AnyOf, FaultClassification, FaultClassifier, FaultOrigin, OriginClassifier,
    RETRYABLE_STATUS_CODES, find_cause, is_retryable_status,
};
pub use policy::RetryPolicy;
