//! Spreadsheet values client: appending tabular rows.
//!
//! Sink workers batch records into row groups and push each batch through
//! this client; the retry executor wraps every append the same way listing
//! pages are wrapped on the source side.

use driveflow_common::{RetryConfig, RetryExecutor};
use driveflow_domain::{RemoteError, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::drive::classify::TransientErrorPolicy;
use crate::errors::conversions::{ensure_success, map_retry_error, IntoRemoteError};

/// Production endpoint for the spreadsheets API.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Client for appending value rows to a spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    retry: RetryExecutor<TransientErrorPolicy>,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        access_token: impl Into<String>,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            http,
            base_url: SHEETS_API_BASE.to_string(),
            access_token: access_token.into(),
            retry: RetryExecutor::new(retry_config, TransientErrorPolicy),
        }
    }

    /// Point the client at a different endpoint (fakes in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Append rows beneath the given A1-notation range.
    ///
    /// Returns the number of rows the service reports as appended.
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<Value>],
    ) -> Result<u32> {
        let appended = self
            .retry
            .execute(|| async move { self.append_once(spreadsheet_id, range, rows).await })
            .await
            .map_err(map_retry_error)?;

        debug!(spreadsheet_id, appended, "append complete");
        Ok(appended)
    }

    async fn append_once(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<Value>],
    ) -> std::result::Result<u32, RemoteError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append",
            self.base_url, spreadsheet_id, range
        );
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await
            .map_err(IntoRemoteError::into_remote)?;

        let response = ensure_success(response).await?;
        let reply: AppendResponse = response.json().await.map_err(IntoRemoteError::into_remote)?;

        Ok(reply.updates.and_then(|updates| updates.updated_rows).unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
struct AppendUpdates {
    #[serde(rename = "updatedRows")]
    updated_rows: Option<u32>,
}
