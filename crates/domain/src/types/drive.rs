//! Value objects describing drive contents and listing filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DRIVE_APPS_SCRIPT_MIME, DRIVE_DOCUMENT_MIME, DRIVE_DRAWING_MIME, DRIVE_PRESENTATION_MIME,
    DRIVE_SPREADSHEET_MIME,
};
use crate::errors::DriveFlowError;

/// Category of document used to filter directory listings by MIME type.
///
/// `Binary` is the odd one out: it has no MIME type of its own and instead
/// matches everything that is not a native drive document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportedType {
    Binary,
    Documents,
    Spreadsheets,
    Drawings,
    Presentations,
    AppScripts,
}

impl ExportedType {
    /// The exact MIME type to match in a listing filter, or `None` for
    /// `Binary` (matched by prefix exclusion instead).
    pub fn mime(&self) -> Option<&'static str> {
        match self {
            Self::Binary => None,
            Self::Documents => Some(DRIVE_DOCUMENT_MIME),
            Self::Spreadsheets => Some(DRIVE_SPREADSHEET_MIME),
            Self::Drawings => Some(DRIVE_DRAWING_MIME),
            Self::Presentations => Some(DRIVE_PRESENTATION_MIME),
            Self::AppScripts => Some(DRIVE_APPS_SCRIPT_MIME),
        }
    }
}

impl FromStr for ExportedType {
    type Err = DriveFlowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "documents" => Ok(Self::Documents),
            "spreadsheets" => Ok(Self::Spreadsheets),
            "drawings" => Ok(Self::Drawings),
            "presentations" => Ok(Self::Presentations),
            "appscripts" => Ok(Self::AppScripts),
            _ => Err(DriveFlowError::InvalidFilterType(value.to_string())),
        }
    }
}

/// Named modified-date window applied to directory listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateRangeType {
    #[default]
    None,
    Last7Days,
    Last30Days,
    PreviousQuarter,
    CurrentQuarter,
    LastYear,
    CurrentYear,
    Custom,
}

impl FromStr for DateRangeType {
    type Err = DriveFlowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "last7days" => Ok(Self::Last7Days),
            "last30days" => Ok(Self::Last30Days),
            "previousquarter" => Ok(Self::PreviousQuarter),
            "currentquarter" => Ok(Self::CurrentQuarter),
            "lastyear" => Ok(Self::LastYear),
            "currentyear" => Ok(Self::CurrentYear),
            "custom" => Ok(Self::Custom),
            _ => Err(DriveFlowError::InvalidDateRange(format!(
                "unrecognized modified date range type '{value}'"
            ))),
        }
    }
}

/// Resolved modified-date window, both bounds formatted for the listing
/// filter grammar. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self { start_date: start_date.into(), end_date: end_date.into() }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start_date, self.end_date)
    }
}

/// Metadata for one file returned by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub modified_time: Option<String>,
}
