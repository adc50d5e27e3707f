//! Retry engine driving an operation under a classifier and backoff schedule.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{CancellationToken, FaultClassifier, OriginClassifier};
use crate::config::RetryConfig;
use crate::error::{Error, ErrorKind, Result};

/// Retries an operation while its failures classify as transient.
///
/// Failure handling per attempt:
///
/// - local or already-terminal errors (`InvalidArgument`, `InvalidState`,
///   `PermanentRemote`, ...) pass through untouched;
/// - a permanent verdict surfaces at once as [`ErrorKind::PermanentRemote`];
/// - a transient verdict waits [`RetryConfig::delay_for_attempt`] and tries
///   again, until `max_attempts` is spent, then surfaces as
///   [`ErrorKind::RetryExhausted`].
///
/// The original failure is always kept as the `source()` of the surfaced
/// error. The policy knows nothing about what the operation mutates, so the
/// operation must be idempotent (see `SaveTransaction`'s batch id).
///
/// ## Example
///
/// ```rust
/// use cloudmedia::{Error, RetryConfig};
/// use cloudmedia::retry::RetryPolicy;
///
/// # async fn demo() -> cloudmedia::Result<()> {
/// let policy = RetryPolicy::for_queries(RetryConfig::new().with_max_attempts(3));
/// let value = policy.execute(|| async { Ok::<_, Error>(42) }).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    classifier: Arc<dyn FaultClassifier>,
}

impl RetryPolicy {
    /// Creates a policy from a configuration and a classifier.
    pub fn new(config: RetryConfig, classifier: impl FaultClassifier + 'static) -> Self {
        Self {
            config,
            classifier: Arc::new(classifier),
        }
    }

    /// Creates a policy sharing an existing classifier.
    pub fn with_shared_classifier(config: RetryConfig, classifier: Arc<dyn FaultClassifier>) -> Self {
        Self { config, classifier }
    }

    /// Policy for query execution.
    pub fn for_queries(config: RetryConfig) -> Self {
        Self::new(config, OriginClassifier::query())
    }

    /// Policy for save transaction commits.
    pub fn for_saves(config: RetryConfig) -> Self {
        Self::new(config, OriginClassifier::save())
    }

    /// Returns the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run(operation, None).await
    }

    /// Like [`execute`](Self::execute), but abandons the loop once `token` is
    /// cancelled.
    ///
    /// The token is checked before each attempt and raced against every
    /// backoff delay. The returned [`ErrorKind::Cancelled`] error carries the
    /// last transient failure, if any, as its source.
    pub async fn execute_with_cancel<T, F, Fut>(
        &self,
        operation: F,
        token: &CancellationToken,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run(operation, Some(token)).await
    }

    async fn run<T, F, Fut>(&self, mut operation: F, token: Option<&CancellationToken>) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if token.is_some_and(CancellationToken::is_cancelled) {
                debug!(attempt, "retry loop cancelled before attempt");
                return Err(Error::cancelled());
            }

            attempt += 1;
            let err = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !err.kind().is_origin() {
                return Err(err);
            }

            if !self.classifier.classify(&err).is_transient() {
                debug!(attempt, error = %err, "permanent failure");
                return Err(err.wrap(ErrorKind::PermanentRemote));
            }

            if attempt >= max_attempts {
                warn!(attempt, error = %err, "transient failure persisted, giving up");
                return Err(err.wrap(ErrorKind::RetryExhausted));
            }

            let delay = self.config.delay_for_attempt(attempt);
            warn!(attempt, ?delay, error = %err, "transient failure, retrying");

            match token {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => {
                            debug!(attempt, "retry loop cancelled during backoff");
                            return Err(Error::cancelled().with_source(err));
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                None => tokio::time::sleep(delay).await,
            }
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
