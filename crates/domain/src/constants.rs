//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! connector.

// Drive MIME types
pub const DRIVE_FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const DRIVE_DOCUMENT_MIME: &str = "application/vnd.google-apps.document";
pub const DRIVE_SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
pub const DRIVE_DRAWING_MIME: &str = "application/vnd.google-apps.drawing";
pub const DRIVE_PRESENTATION_MIME: &str = "application/vnd.google-apps.presentation";
pub const DRIVE_APPS_SCRIPT_MIME: &str = "application/vnd.google-apps.script";
/// Prefix shared by every native drive document MIME type. Binary files are
/// whatever does NOT carry this prefix.
pub const DRIVE_DOCS_MIME_PREFIX: &str = "application/vnd.google-apps";

// Retry configuration defaults
pub const DEFAULT_MAX_RETRIES: u32 = 8;
pub const DEFAULT_BASE_WAIT_MS: u64 = 1_000;
pub const DEFAULT_MAX_WAIT_MS: u64 = 60_000;
pub const DEFAULT_JITTER_WAIT_MS: u64 = 100;

// Listing configuration defaults
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// Timestamp layout used inside listing filter clauses (millisecond
// precision, no zone suffix)
pub const FILTER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
