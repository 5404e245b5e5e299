//! Configuration loader
//!
//! Resolves user-facing connector settings into typed listing options and
//! loads settings from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `DRIVEFLOW_DIRECTORY_ID`: Directory whose contents are listed
//! - `DRIVEFLOW_FILE_TYPES`: Comma-separated exported type names
//! - `DRIVEFLOW_FILTER`: Free-form filter clause
//! - `DRIVEFLOW_DATE_RANGE`: Named modified-date range type
//! - `DRIVEFLOW_START_DATE` / `DRIVEFLOW_END_DATE`: Custom range bounds
//! - `DRIVEFLOW_PAGE_SIZE`: Items per listing page
//!
//! ## File Locations
//! The loader probes `./driveflow.toml` and `./driveflow.json` in the
//! current working directory when no explicit path is given.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;
use driveflow_common::RetryConfig;
use driveflow_domain::{
    DateRangeType, DriveFlowError, ExportedType, Result, RetrySettings, SinkSettings,
    SourceSettings,
};

use crate::drive::date_range::resolve_date_range;
use crate::drive::query::ListQuery;

/// Source configuration after string-form settings have been parsed and
/// validated.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub directory_id: String,
    pub exported_types: Vec<ExportedType>,
    pub filter: Option<String>,
    pub range_type: DateRangeType,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page_size: u32,
    pub retry: RetryConfig,
}

impl ResolvedSource {
    /// Build the listing filter expression for this configuration at the
    /// given reference instant.
    pub fn listing_query(&self, now: NaiveDateTime) -> Result<String> {
        let range = resolve_date_range(
            self.range_type,
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            now,
        )?;

        Ok(ListQuery::new(&self.directory_id)
            .exported_types(self.exported_types.iter().copied())
            .filter(self.filter.clone().unwrap_or_default())
            .modified_range(range)
            .build())
    }
}

/// Parse and validate raw source settings.
///
/// # Errors
/// Returns `DriveFlowError::Config` for an empty directory id or invalid
/// retry knobs, `InvalidFilterType` for unknown exported type names, and
/// `InvalidDateRange` for an unknown range type.
pub fn resolve_source(settings: &SourceSettings) -> Result<ResolvedSource> {
    if settings.directory_id.trim().is_empty() {
        return Err(DriveFlowError::Config("directory_id must not be empty".to_string()));
    }

    let exported_types = settings
        .file_types
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ExportedType::from_str)
        .collect::<Result<Vec<_>>>()?;

    let range_type = settings.modified_date_range.parse::<DateRangeType>()?;
    let filter = non_empty(&settings.filter);
    let retry = resolve_retry(&settings.retry)?;

    Ok(ResolvedSource {
        directory_id: settings.directory_id.trim().to_string(),
        exported_types,
        filter,
        range_type,
        start_date: settings.start_date.clone(),
        end_date: settings.end_date.clone(),
        page_size: settings.page_size,
        retry,
    })
}

/// Sink configuration after validation.
#[derive(Debug, Clone)]
pub struct ResolvedSink {
    pub spreadsheet_id: String,
    pub range: String,
    pub retry: RetryConfig,
}

/// Validate raw sink settings.
///
/// # Errors
/// Returns `DriveFlowError::Config` for a blank spreadsheet id or range,
/// or invalid retry knobs.
pub fn resolve_sink(settings: &SinkSettings) -> Result<ResolvedSink> {
    if settings.spreadsheet_id.trim().is_empty() {
        return Err(DriveFlowError::Config("spreadsheet_id must not be empty".to_string()));
    }
    if settings.range.trim().is_empty() {
        return Err(DriveFlowError::Config("range must not be empty".to_string()));
    }

    Ok(ResolvedSink {
        spreadsheet_id: settings.spreadsheet_id.trim().to_string(),
        range: settings.range.trim().to_string(),
        retry: resolve_retry(&settings.retry)?,
    })
}

/// Convert user-facing retry knobs into an executor configuration.
///
/// # Errors
/// Returns `DriveFlowError::Config` when the knobs violate
/// `max_wait > base_wait > 0`.
pub fn resolve_retry(settings: &RetrySettings) -> Result<RetryConfig> {
    RetryConfig::builder()
        .max_retries(settings.max_retries)
        .base_wait(Duration::from_millis(settings.base_wait_ms))
        .max_wait(Duration::from_millis(settings.max_wait_ms))
        .jitter_bound(Duration::from_millis(settings.jitter_wait_ms))
        .build()
        .map_err(|err| DriveFlowError::Config(err.to_string()))
}

/// Load source settings with automatic fallback strategy.
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
pub fn load_source_settings() -> Result<SourceSettings> {
    match load_from_env() {
        Ok(settings) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(settings)
        }
        Err(err) => {
            tracing::debug!(error = ?err, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load source settings from environment variables.
///
/// Only `DRIVEFLOW_DIRECTORY_ID` is required; every other variable falls
/// back to its default.
pub fn load_from_env() -> Result<SourceSettings> {
    let directory_id = env_var("DRIVEFLOW_DIRECTORY_ID")?;
    let page_size = match std::env::var("DRIVEFLOW_PAGE_SIZE") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|err| DriveFlowError::Config(format!("Invalid page size: {err}")))?,
        Err(_) => driveflow_domain::constants::DEFAULT_PAGE_SIZE,
    };

    Ok(SourceSettings {
        directory_id,
        file_types: std::env::var("DRIVEFLOW_FILE_TYPES").unwrap_or_default(),
        filter: std::env::var("DRIVEFLOW_FILTER").unwrap_or_default(),
        modified_date_range: std::env::var("DRIVEFLOW_DATE_RANGE")
            .unwrap_or_else(|_| "none".to_string()),
        start_date: std::env::var("DRIVEFLOW_START_DATE").ok(),
        end_date: std::env::var("DRIVEFLOW_END_DATE").ok(),
        page_size,
        retry: RetrySettings::default(),
    })
}

/// Load source settings from a file.
///
/// If `path` is `None`, probes the default locations. Format is detected by
/// file extension (`.toml` or `.json`).
pub fn load_from_file(path: Option<&Path>) -> Result<SourceSettings> {
    let path = match path {
        Some(explicit) => {
            if !explicit.exists() {
                return Err(DriveFlowError::Config(format!(
                    "Config file not found: {}",
                    explicit.display()
                )));
            }
            explicit.to_path_buf()
        }
        None => probe_config_paths().ok_or_else(|| {
            DriveFlowError::Config("No config file found in default locations".to_string())
        })?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|err| {
        DriveFlowError::Config(format!("Failed to read {}: {err}", path.display()))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .map_err(|err| DriveFlowError::Config(format!("Invalid TOML config: {err}"))),
        Some("json") => serde_json::from_str(&contents)
            .map_err(|err| DriveFlowError::Config(format!("Invalid JSON config: {err}"))),
        other => Err(DriveFlowError::Config(format!(
            "Unsupported config format: {}",
            other.unwrap_or("<none>")
        ))),
    }
}

fn probe_config_paths() -> Option<PathBuf> {
    ["./driveflow.toml", "./driveflow.json"]
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| DriveFlowError::Config(format!("Missing environment variable: {name}")))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use driveflow_domain::constants::DEFAULT_PAGE_SIZE;

    use super::*;

    fn base_settings() -> SourceSettings {
        SourceSettings {
            directory_id: "dir-123".to_string(),
            file_types: String::new(),
            filter: String::new(),
            modified_date_range: "none".to_string(),
            start_date: None,
            end_date: None,
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetrySettings::default(),
        }
    }

    /// Validates `resolve_source` behavior for the happy path scenario.
    ///
    /// Assertions:
    /// - Confirms CSV type names parse into typed values.
    /// - Confirms the named range type is resolved.
    #[test]
    fn test_resolve_source_parses_string_forms() {
        let mut settings = base_settings();
        settings.file_types = "spreadsheets, documents".to_string();
        settings.modified_date_range = "last7Days".to_string();
        settings.filter = "  name contains 'x'  ".to_string();

        let resolved = resolve_source(&settings).expect("valid settings");
        assert_eq!(
            resolved.exported_types,
            vec![ExportedType::Spreadsheets, ExportedType::Documents]
        );
        assert_eq!(resolved.range_type, DateRangeType::Last7Days);
        assert_eq!(resolved.filter.as_deref(), Some("name contains 'x'"));
    }

    /// Validates `resolve_source` behavior for the empty directory scenario.
    #[test]
    fn test_resolve_source_requires_directory_id() {
        let mut settings = base_settings();
        settings.directory_id = "   ".to_string();
        assert!(matches!(resolve_source(&settings), Err(DriveFlowError::Config(_))));
    }

    /// Validates `resolve_source` behavior for the unknown type scenario.
    #[test]
    fn test_resolve_source_rejects_unknown_file_type() {
        let mut settings = base_settings();
        settings.file_types = "spreadsheets,archives".to_string();
        assert!(matches!(resolve_source(&settings), Err(DriveFlowError::InvalidFilterType(_))));
    }

    /// Validates `resolve_sink` behavior for the blank identifier scenario.
    #[test]
    fn test_resolve_sink_requires_identifiers() {
        let settings = SinkSettings {
            spreadsheet_id: "sheet-1".to_string(),
            range: "Sheet1!A1".to_string(),
            retry: RetrySettings::default(),
        };
        let resolved = resolve_sink(&settings).expect("valid settings");
        assert_eq!(resolved.spreadsheet_id, "sheet-1");

        let blank = SinkSettings { spreadsheet_id: " ".to_string(), ..settings };
        assert!(matches!(resolve_sink(&blank), Err(DriveFlowError::Config(_))));
    }

    /// Validates `resolve_retry` behavior for the invalid knobs scenario.
    ///
    /// Assertions:
    /// - Ensures a base wait at or above the max wait fails as `Config`.
    #[test]
    fn test_resolve_retry_validates_bounds() {
        let mut retry = RetrySettings::default();
        retry.base_wait_ms = 60_000;
        retry.max_wait_ms = 1_000;
        assert!(matches!(resolve_retry(&retry), Err(DriveFlowError::Config(_))));
    }

    /// Tests the resolved-configuration-to-filter-expression path end to
    /// end with a pinned clock.
    #[test]
    fn test_listing_query_from_resolved_source() {
        let mut settings = base_settings();
        settings.file_types = "spreadsheets".to_string();
        settings.modified_date_range = "last7Days".to_string();
        let resolved = resolve_source(&settings).expect("valid settings");

        let now = NaiveDateTime::parse_from_str("2019-09-19T19:52:13.456", "%Y-%m-%dT%H:%M:%S%.3f")
            .expect("valid timestamp");
        let query = resolved.listing_query(now).expect("query builds");

        assert_eq!(
            query,
            "'dir-123' in parents \
             and mimeType != 'application/vnd.google-apps.folder' \
             and (mimeType = 'application/vnd.google-apps.spreadsheet') \
             and modifiedTime >= '2019-09-12T19:52:13.456' \
             and modifiedTime <= '2019-09-19T19:52:13.456'"
        );
    }

    /// Validates `load_from_file` behavior for the TOML scenario.
    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("driveflow.toml");
        let mut file = std::fs::File::create(&path).expect("create config");
        writeln!(
            file,
            "directory_id = \"dir-from-file\"\nfile_types = \"documents\"\npage_size = 25"
        )
        .expect("write config");

        let settings = load_from_file(Some(&path)).expect("load config");
        assert_eq!(settings.directory_id, "dir-from-file");
        assert_eq!(settings.file_types, "documents");
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.retry, RetrySettings::default());
    }

    /// Validates `load_from_file` behavior for the JSON scenario.
    #[test]
    fn test_load_from_json_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("driveflow.json");
        std::fs::write(&path, r#"{"directory_id": "json-dir", "modified_date_range": "lastYear"}"#)
            .expect("write config");

        let settings = load_from_file(Some(&path)).expect("load config");
        assert_eq!(settings.directory_id, "json-dir");
        assert_eq!(settings.modified_date_range, "lastYear");
    }

    /// Validates `load_from_file` behavior for the missing file scenario.
    #[test]
    fn test_load_from_missing_file_fails() {
        let result = load_from_file(Some(Path::new("/nonexistent/driveflow.toml")));
        assert!(matches!(result, Err(DriveFlowError::Config(_))));
    }
}
