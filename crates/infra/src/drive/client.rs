//! Drive files client: paginated listing and media download.
//!
//! Every remote call goes through the retry executor with the transient
//! classification from [`super::classify`]. Pagination is strictly
//! sequential; continuation tokens form a chain, so pages are never fetched
//! concurrently.

use driveflow_common::{RetryConfig, RetryExecutor};
use driveflow_domain::constants::DEFAULT_PAGE_SIZE;
use driveflow_domain::{DriveFile, RemoteError, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::classify::TransientErrorPolicy;
use crate::errors::conversions::{ensure_success, map_retry_error, IntoRemoteError};

/// Production endpoint for the files API.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,size,modifiedTime)";

/// Client for the files listing and download endpoints.
///
/// The HTTP handle is injected rather than created internally, so callers
/// control connection reuse and tests can point the client at a fake
/// server via [`DriveFilesClient::with_base_url`].
pub struct DriveFilesClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    page_size: u32,
    retry: RetryExecutor<TransientErrorPolicy>,
}

impl DriveFilesClient {
    pub fn new(
        http: reqwest::Client,
        access_token: impl Into<String>,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            http,
            base_url: DRIVE_API_BASE.to_string(),
            access_token: access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryExecutor::new(retry_config, TransientErrorPolicy),
        }
    }

    /// Point the client at a different endpoint (fakes in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// List every item matching the filter expression, following
    /// continuation tokens until the listing is exhausted.
    #[instrument(skip(self, query))]
    pub async fn list_all(&self, query: &str) -> Result<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = page_token.clone();
            let page = self
                .retry
                .execute(|| {
                    let token = token.clone();
                    async move { self.list_page(query, token.as_deref()).await }
                })
                .await
                .map_err(map_retry_error)?;

            files.extend(page.files);
            page_token = page.next_page_token;

            if page_token.is_none() {
                break;
            }
            debug!(accumulated = files.len(), "following listing continuation token");
        }

        debug!(total = files.len(), "directory listing complete");
        Ok(files)
    }

    /// Fetch one listing page, retry-wrapped by the caller.
    async fn list_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> std::result::Result<FileListPage, RemoteError> {
        let url = format!("{}/files", self.base_url);
        let page_size = self.page_size.to_string();

        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("q", query), ("pageSize", page_size.as_str()), ("fields", LIST_FIELDS)]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(IntoRemoteError::into_remote)?;
        let response = ensure_success(response).await?;

        let listing: FileListResponse =
            response.json().await.map_err(IntoRemoteError::into_remote)?;

        Ok(FileListPage {
            files: listing.files.into_iter().map(FileResource::into_domain).collect(),
            next_page_token: listing.next_page_token,
        })
    }

    /// Download the raw bytes of a file (source side media download).
    #[instrument(skip(self))]
    pub async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let bytes = self
            .retry
            .execute(|| async move { self.fetch_media(file_id).await })
            .await
            .map_err(map_retry_error)?;

        debug!(file_id, size = bytes.len(), "file download complete");
        Ok(bytes)
    }

    async fn fetch_media(&self, file_id: &str) -> std::result::Result<Vec<u8>, RemoteError> {
        let url = format!("{}/files/{}", self.base_url, file_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(IntoRemoteError::into_remote)?;

        let response = ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(IntoRemoteError::into_remote)?;
        Ok(bytes.to_vec())
    }
}

/// One page of listing results plus the continuation token, if any.
#[derive(Debug)]
pub struct FileListPage {
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<FileResource>,
}

#[derive(Debug, Deserialize)]
struct FileResource {
    id: String,
    name: Option<String>,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    // The files API reports sizes as decimal strings.
    size: Option<String>,
    #[serde(rename = "modifiedTime")]
    modified_time: Option<String>,
}

impl FileResource {
    fn into_domain(self) -> DriveFile {
        DriveFile {
            id: self.id,
            name: self.name.unwrap_or_default(),
            mime_type: self.mime_type,
            size_bytes: self.size.and_then(|size| size.parse().ok()),
            modified_time: self.modified_time,
        }
    }
}
