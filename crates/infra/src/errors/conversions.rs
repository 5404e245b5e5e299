//! Folds transport-library failures and retry outcomes into the domain
//! error shapes, keeping every `reqwest` type on the infrastructure side.

use driveflow_common::RetryError;
use driveflow_domain::{DriveFlowError, RemoteError};
use reqwest::Error as HttpError;
use reqwest::Response;
use serde::Deserialize;

/// Extension trait to make the conversion logic explicit in tests and within
/// this crate.
pub(crate) trait IntoRemoteError {
    fn into_remote(self) -> RemoteError;
}

impl IntoRemoteError for HttpError {
    fn into_remote(self) -> RemoteError {
        if self.is_timeout() {
            return RemoteError::Timeout { message: self.to_string() };
        }
        match self.status() {
            Some(status) => RemoteError::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .map_or_else(|| status.to_string(), str::to_string),
                source: Some(Box::new(self)),
            },
            None => RemoteError::Transport { message: self.to_string(), source: Some(Box::new(self)) },
        }
    }
}

/// Map the retry layer's outcome onto the domain error taxonomy.
///
/// Fatal errors pass through untouched; exhaustion keeps the last transient
/// error as cause.
pub(crate) fn map_retry_error(error: RetryError<RemoteError>) -> DriveFlowError {
    match error {
        RetryError::Fatal(source) => DriveFlowError::Remote(source),
        RetryError::RetriesExhausted { attempts, source } => {
            DriveFlowError::RetriesExhausted { attempts, source }
        }
        RetryError::Cancelled => DriveFlowError::Cancelled,
    }
}

/// Pass a successful response through, or normalize a non-success status
/// into [`RemoteError::Status`].
///
/// The status message prefers the API error body's `error.message` (the
/// field retry classification matches on) and falls back to the HTTP
/// canonical reason.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message_from_body(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    Err(RemoteError::status(status.as_u16(), message))
}

fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body).ok().map(|parsed| parsed.error.message)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
