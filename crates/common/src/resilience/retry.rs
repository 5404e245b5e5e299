//! Retry executor for remote operations against rate-limited services.
//!
//! The executor repeatedly invokes a caller-supplied operation, consulting a
//! [`RetryPolicy`] after each failure and the [`BackoffPolicy`] before each
//! further attempt. Fatal errors propagate untouched; transient errors are
//! retried until the retry budget runs out. Every retry is reported to a
//! pluggable [`RetryObserver`] so telemetry is never hardwired.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::backoff::{BackoffPolicy, JitterSource, ThreadRngJitter};

/// Default retry attempts after the initial call
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default first backoff delay
pub const DEFAULT_BASE_WAIT: Duration = Duration::from_millis(100);

/// Default cap on any single backoff delay
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

/// Default bound on the random jitter component
pub const DEFAULT_JITTER_BOUND: Duration = Duration::from_millis(100);

/// Errors that can surface from a retried operation
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The retry budget was consumed while the policy still reported the
    /// error as retryable. Carries the last observed error as cause.
    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    /// The policy classified the error as fatal; it is passed through
    /// untouched, with no retry.
    #[error(transparent)]
    Fatal(E),

    /// The cancellation token fired while waiting between attempts.
    #[error("operation cancelled while waiting to retry")]
    Cancelled,
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// The retry configuration failed validation
#[derive(Debug, Error)]
#[error("invalid retry configuration: {message}")]
pub struct InvalidRetryConfig {
    message: String,
}

impl InvalidRetryConfig {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry with the default backoff delay
    Retry,
    /// Retry after a custom delay
    RetryAfter(Duration),
    /// Don't retry; the error is fatal
    Stop,
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide whether the error observed on the given 1-based attempt should
    /// be retried.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Callback invoked on every retry, before the backoff sleep.
///
/// Receives the 1-based number of the attempt that just failed, the delay
/// chosen before the next attempt, and the triggering error.
pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, attempt: u32, delay: Duration, error: &(dyn std::error::Error + 'static));
}

/// Default observer: structured warning per retry via `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRetryObserver;

impl RetryObserver for TracingRetryObserver {
    fn on_retry(&self, attempt: u32, delay: Duration, error: &(dyn std::error::Error + 'static)) {
        warn!(attempt, delay = ?delay, error = %error, "remote operation failed, backing off before retry");
    }
}

/// Immutable retry configuration, supplied once per operation family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// First backoff delay.
    pub base_wait: Duration,
    /// Upper bound on any single backoff delay.
    pub max_wait: Duration,
    /// Upper bound on the random jitter added to each delay.
    pub jitter_bound: Duration,
    /// Retry attempts after the initial call. 0 means the operation is
    /// invoked exactly once.
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_wait: DEFAULT_BASE_WAIT,
            max_wait: DEFAULT_MAX_WAIT,
            jitter_bound: DEFAULT_JITTER_BOUND,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration: `max_wait > base_wait > 0` must hold.
    pub fn validate(&self) -> Result<(), InvalidRetryConfig> {
        if self.base_wait.is_zero() {
            return Err(InvalidRetryConfig::new("base_wait must be greater than zero"));
        }
        if self.max_wait <= self.base_wait {
            return Err(InvalidRetryConfig::new(format!(
                "max_wait ({:?}) must be greater than base_wait ({:?})",
                self.max_wait, self.base_wait
            )));
        }
        Ok(())
    }

    fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.base_wait, self.max_wait)
    }
}

/// Builder for [`RetryConfig`] with validation at build time
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn base_wait(mut self, delay: Duration) -> Self {
        self.config.base_wait = delay;
        self
    }

    pub fn max_wait(mut self, delay: Duration) -> Self {
        self.config.max_wait = delay;
        self
    }

    pub fn jitter_bound(mut self, bound: Duration) -> Self {
        self.config.jitter_bound = bound;
        self
    }

    pub fn build(self) -> Result<RetryConfig, InvalidRetryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor.
///
/// Holds read-only configuration only; concurrent executions are independent.
pub struct RetryExecutor<P, J = ThreadRngJitter> {
    config: RetryConfig,
    policy: P,
    jitter: J,
    observer: Arc<dyn RetryObserver>,
    cancel: Option<CancellationToken>,
}

impl<P> RetryExecutor<P, ThreadRngJitter> {
    /// Create an executor with the default jitter source and the tracing
    /// observer.
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self {
            config,
            policy,
            jitter: ThreadRngJitter,
            observer: Arc::new(TracingRetryObserver),
            cancel: None,
        }
    }
}

impl<P, J> RetryExecutor<P, J> {
    /// Swap in a different jitter source (deterministic sources in tests).
    pub fn with_jitter_source<J2>(self, jitter: J2) -> RetryExecutor<P, J2>
    where
        J2: JitterSource,
    {
        RetryExecutor {
            config: self.config,
            policy: self.policy,
            jitter,
            observer: self.observer,
            cancel: self.cancel,
        }
    }

    /// Replace the retry observer (silent operation, alternate telemetry).
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Attach a cancellation token checked at the suspension point between
    /// attempts.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic.
    ///
    /// The operation is invoked at least once. A fatal classification
    /// propagates the original error unchanged, even on the last attempt;
    /// a transient one consumes one unit of retry budget, waits for the
    /// backoff delay (plus jitter), and tries again.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        J: JitterSource,
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let backoff = self.config.backoff();
        let mut invocations: u32 = 0;

        loop {
            invocations += 1;
            debug!(
                attempt = invocations,
                max_retries = self.config.max_retries,
                "executing remote operation"
            );

            let error = match operation().await {
                Ok(value) => {
                    if invocations > 1 {
                        debug!(attempts = invocations, "operation succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            match self.policy.should_retry(&error, invocations) {
                RetryDecision::Stop => {
                    debug!(error = %error, "error classified as fatal, not retrying");
                    return Err(RetryError::Fatal(error));
                }
                decision => {
                    if invocations > self.config.max_retries {
                        warn!(
                            attempts = invocations,
                            error = %error,
                            "retry budget exhausted"
                        );
                        return Err(RetryError::RetriesExhausted {
                            attempts: invocations,
                            source: error,
                        });
                    }

                    let delay = match decision {
                        RetryDecision::RetryAfter(custom) => custom,
                        _ => backoff.delay_with_jitter(
                            invocations,
                            self.config.jitter_bound,
                            &self.jitter,
                        ),
                    };

                    self.observer.on_retry(invocations, delay, &error);

                    if !self.suspend(delay).await {
                        return Err(RetryError::Cancelled);
                    }
                }
            }
        }
    }

    /// Sleep for the backoff delay; returns `false` when cancelled instead.
    async fn suspend(&self, delay: Duration) -> bool {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    () = token.cancelled() => false,
                    () = tokio::time::sleep(delay) => true,
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                true
            }
        }
    }
}

/// Convenience function to create an executor and run a single operation
pub async fn retry_with_policy<F, Fut, T, E, P>(
    config: RetryConfig,
    policy: P,
    operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: std::error::Error + 'static,
{
    let executor = RetryExecutor::new(config, policy);
    executor.execute(operation).await
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - treats every error as fatal
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }
}
