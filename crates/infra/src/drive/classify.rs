//! Transient-vs-fatal classification of remote drive failures.
//!
//! Classification is a structural match over the normalized error shape, so
//! the retry layer never depends on any particular transport library. The
//! rate limiter behind the drive API reports throttling inconsistently
//! (429 with either canonical message, or 403 with "Rate Limit Exceeded"),
//! which is why message matching exists at all.

use driveflow_common::{RetryDecision, RetryPolicy};
use driveflow_domain::RemoteError;

const TOO_MANY_REQUESTS: &str = "Too Many Requests";
const RATE_LIMIT_EXCEEDED: &str = "Rate Limit Exceeded";

/// Whether a remote failure is expected to clear on retry.
///
/// Retryable failures are rate limiting (429 with either throttle message,
/// 403 with "Rate Limit Exceeded"), backend errors (500), service
/// unavailability (503), and network-level timeouts. Everything else —
/// auth failures, not-found, malformed requests, permanently exceeded
/// quotas — is fatal.
pub fn is_transient(error: &RemoteError) -> bool {
    match error {
        RemoteError::Timeout { .. } => true,
        RemoteError::Status { status: 500 | 503, .. } => true,
        RemoteError::Status { status: 429, message, .. } => {
            matches_message(message, TOO_MANY_REQUESTS)
                || matches_message(message, RATE_LIMIT_EXCEEDED)
        }
        RemoteError::Status { status: 403, message, .. } => {
            matches_message(message, RATE_LIMIT_EXCEEDED)
        }
        RemoteError::Status { .. } | RemoteError::Transport { .. } => false,
    }
}

fn matches_message(message: &str, expected: &str) -> bool {
    message.trim().eq_ignore_ascii_case(expected)
}

/// [`RetryPolicy`] wiring of [`is_transient`] for the retry executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientErrorPolicy;

impl RetryPolicy<RemoteError> for TransientErrorPolicy {
    fn should_retry(&self, error: &RemoteError, _attempt: u32) -> RetryDecision {
        if is_transient(error) {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}
