//! Exponential backoff timing with additive jitter.

use std::time::Duration;

use rand::Rng;

/// Cap on the backoff exponent to keep the multiplier from overflowing.
pub const MAX_BACKOFF_EXPONENT: u32 = 30;

/// Exponential backoff: `base_wait * 2^(attempt - 1)`, capped at `max_wait`.
///
/// Jitter is not part of the policy itself. Callers combine the exponential
/// component with an independent random component from a [`JitterSource`];
/// the two are summed, never multiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_wait: Duration,
    max_wait: Duration,
}

impl BackoffPolicy {
    pub fn new(base_wait: Duration, max_wait: Duration) -> Self {
        Self { base_wait, max_wait }
    }

    /// Delay before retrying after the given attempt.
    ///
    /// `attempt` is 1-based (1 = first attempt). Attempt numbers below 1 are
    /// treated as 1. The result never exceeds `max_wait` and grows
    /// monotonically until the cap is reached.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        let multiplier = 2_u64.saturating_pow(exponent);

        let base_millis = self.base_wait.as_millis() as u64;
        let max_millis = self.max_wait.as_millis() as u64;
        let delay_millis = base_millis.saturating_mul(multiplier).min(max_millis);

        Duration::from_millis(delay_millis)
    }

    /// Exponential delay for the attempt plus an independent random
    /// component drawn from `source`, bounded by `jitter_bound`.
    pub fn delay_with_jitter<S>(&self, attempt: u32, jitter_bound: Duration, source: &S) -> Duration
    where
        S: JitterSource + ?Sized,
    {
        self.delay_for_attempt(attempt) + source.sample(jitter_bound)
    }
}

/// Source of the random jitter component.
///
/// Injectable so tests can pin the random term; production code uses
/// [`ThreadRngJitter`].
pub trait JitterSource: Send + Sync {
    /// Draw a uniformly distributed duration in `[0, bound]`.
    fn sample(&self, bound: Duration) -> Duration;
}

/// Default jitter source backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn sample(&self, bound: Duration) -> Duration {
        if bound.is_zero() {
            return Duration::ZERO;
        }
        let bound_millis = bound.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=bound_millis))
    }
}
