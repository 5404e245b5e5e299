//! User-facing connector configuration structures.
//!
//! These mirror the knobs the host pipeline exposes to end users. Values
//! arrive as plain strings/numbers and are resolved into typed listing
//! options by the infrastructure layer; validation of the resolved values
//! happens there as well.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_WAIT_MS, DEFAULT_JITTER_WAIT_MS, DEFAULT_MAX_RETRIES, DEFAULT_MAX_WAIT_MS,
    DEFAULT_PAGE_SIZE,
};

/// Retry knobs shared by the source and sink sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retry attempts after the initial call; 0 disables retrying.
    pub max_retries: u32,
    /// First backoff delay in milliseconds.
    pub base_wait_ms: u64,
    /// Upper bound on any single backoff delay, in milliseconds.
    pub max_wait_ms: u64,
    /// Upper bound on the random jitter added to each delay, in milliseconds.
    pub jitter_wait_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_wait_ms: DEFAULT_BASE_WAIT_MS,
            max_wait_ms: DEFAULT_MAX_WAIT_MS,
            jitter_wait_ms: DEFAULT_JITTER_WAIT_MS,
        }
    }
}

/// Source-side settings: which directory to read and how to filter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Identifier of the directory whose contents are listed.
    pub directory_id: String,
    /// Comma-separated exported type names (`binary`, `documents`, ...).
    /// Empty means no MIME-type restriction beyond excluding subfolders.
    #[serde(default)]
    pub file_types: String,
    /// Free-form filter clause appended verbatim to the listing query.
    #[serde(default)]
    pub filter: String,
    /// Named modified-date range (`none`, `last7Days`, `custom`, ...).
    #[serde(default = "default_range_type")]
    pub modified_date_range: String,
    /// Literal range bounds, only consulted when the range type is `custom`.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Number of items requested per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Sink-side settings: which spreadsheet receives appended records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkSettings {
    pub spreadsheet_id: String,
    /// A1-notation range the rows are appended under.
    pub range: String,
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_range_type() -> String {
    "none".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `RetrySettings::default` behavior for the defaults scenario.
    ///
    /// Assertions:
    /// - Confirms `settings.max_retries` equals `DEFAULT_MAX_RETRIES`.
    /// - Confirms `settings.base_wait_ms` equals `DEFAULT_BASE_WAIT_MS`.
    #[test]
    fn test_retry_settings_defaults() {
        let settings = RetrySettings::default();
        assert_eq!(settings.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(settings.base_wait_ms, DEFAULT_BASE_WAIT_MS);
        assert_eq!(settings.max_wait_ms, DEFAULT_MAX_WAIT_MS);
        assert_eq!(settings.jitter_wait_ms, DEFAULT_JITTER_WAIT_MS);
    }

    /// Tests that omitted optional source fields fall back to their serde
    /// defaults.
    #[test]
    fn test_source_settings_deserialization_defaults() {
        let settings: SourceSettings =
            serde_json::from_str(r#"{"directory_id": "root-folder"}"#).unwrap();

        assert_eq!(settings.directory_id, "root-folder");
        assert_eq!(settings.modified_date_range, "none");
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert!(settings.file_types.is_empty());
        assert_eq!(settings.retry, RetrySettings::default());
    }
}
