//! Error types used throughout the connector

use thiserror::Error;

/// Normalized shape of a failed remote call.
///
/// Every transport and API-level failure is folded into this one type so that
/// retry classification can match on structure (status code, status message,
/// optional cause) instead of on any particular HTTP client's error type.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote service answered with a non-success HTTP status.
    #[error("remote service responded with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The call timed out before any status code was produced.
    #[error("remote call timed out: {message}")]
    Timeout { message: String },

    /// A network-level failure other than a timeout (DNS, connection reset).
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RemoteError {
    /// Build a status error without an underlying cause.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into(), source: None }
    }

    /// Build a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout { message: message.into() }
    }

    /// The HTTP status code, when the failure carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Timeout { .. } | Self::Transport { .. } => None,
        }
    }

    /// The status message or failure description.
    pub fn message(&self) -> &str {
        match self {
            Self::Status { message, .. }
            | Self::Timeout { message }
            | Self::Transport { message, .. } => message,
        }
    }
}

/// Main error type for DriveFlow
#[derive(Error, Debug)]
pub enum DriveFlowError {
    /// A remote call failed fatally and was not retried.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The retry budget was consumed while the remote kept failing
    /// transiently. Carries the last observed error as cause.
    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: RemoteError,
    },

    /// A custom modified-date range failed validation.
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    /// An unrecognized exported file type was requested for filtering.
    #[error("invalid filter type: {0}")]
    InvalidFilterType(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The operation was cancelled between retry attempts.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for DriveFlow operations
pub type Result<T> = std::result::Result<T, DriveFlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `RemoteError::status` behavior for the accessor scenario.
    ///
    /// Assertions:
    /// - Confirms `err.status_code()` equals `Some(503)`.
    /// - Confirms `err.message()` equals `"Service Unavailable"`.
    #[test]
    fn test_status_error_accessors() {
        let err = RemoteError::status(503, "Service Unavailable");
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.message(), "Service Unavailable");
    }

    /// Validates `RemoteError::timeout` behavior for the no-status scenario.
    ///
    /// Assertions:
    /// - Confirms `err.status_code()` equals `None`.
    #[test]
    fn test_timeout_has_no_status_code() {
        let err = RemoteError::timeout("read timed out");
        assert_eq!(err.status_code(), None);
    }

    /// Tests that a fatal remote error passes through the domain error
    /// unchanged in its rendered form.
    #[test]
    fn test_remote_error_display_is_transparent() {
        let remote = RemoteError::status(404, "Not Found");
        let rendered = remote.to_string();
        let err: DriveFlowError = remote.into();
        assert_eq!(err.to_string(), rendered);
    }

    /// Tests that exhaustion keeps the triggering error reachable via the
    /// standard source chain.
    #[test]
    fn test_retries_exhausted_source_chain() {
        let err = DriveFlowError::RetriesExhausted {
            attempts: 9,
            source: RemoteError::status(429, "Too Many Requests"),
        };
        assert!(err.to_string().contains("9 attempts"));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert!(source.is_some_and(|s| s.contains("Too Many Requests")));
    }
}
