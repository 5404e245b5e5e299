//! Listing filter construction for directory contents.
//!
//! The drive listing endpoint takes a single string filter expression. The
//! clauses here are emitted in a fixed order, all ANDed: parent constraint,
//! folder exclusion, optional exported-type OR-group, optional verbatim user
//! filter, optional modified-date window.

use driveflow_domain::constants::{DRIVE_DOCS_MIME_PREFIX, DRIVE_FOLDER_MIME};
use driveflow_domain::{DateRange, ExportedType};

/// Accumulates listing constraints and renders the filter expression.
///
/// Subfolders are always excluded; listings treat them as structure, not as
/// items.
#[derive(Debug, Clone)]
pub struct ListQuery {
    parent_id: String,
    exported_types: Vec<ExportedType>,
    filter: Option<String>,
    modified_range: Option<DateRange>,
}

impl ListQuery {
    pub fn new(parent_id: impl Into<String>) -> Self {
        Self { parent_id: parent_id.into(), exported_types: Vec::new(), filter: None, modified_range: None }
    }

    /// Restrict the listing to the given exported types. An empty set means
    /// no MIME restriction beyond the folder exclusion.
    pub fn exported_types(mut self, types: impl IntoIterator<Item = ExportedType>) -> Self {
        self.exported_types = types.into_iter().collect();
        self
    }

    /// Append a free-form filter clause verbatim. Blank input is ignored.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = if filter.trim().is_empty() { None } else { Some(filter) };
        self
    }

    /// Constrain items to a modified-time window; `None` emits no clause.
    pub fn modified_range(mut self, range: Option<DateRange>) -> Self {
        self.modified_range = range;
        self
    }

    /// Render the filter expression.
    pub fn build(&self) -> String {
        let mut expression =
            format!("'{}' in parents and mimeType != '{}'", self.parent_id, DRIVE_FOLDER_MIME);

        if !self.exported_types.is_empty() {
            let group = self
                .exported_types
                .iter()
                .map(type_clause)
                .collect::<Vec<_>>()
                .join(" or ");
            expression.push_str(&format!(" and ({group})"));
        }

        if let Some(filter) = &self.filter {
            expression.push_str(&format!(" and {filter}"));
        }

        if let Some(range) = &self.modified_range {
            expression.push_str(&format!(
                " and modifiedTime >= '{}' and modifiedTime <= '{}'",
                range.start_date, range.end_date
            ));
        }

        expression
    }
}

fn type_clause(exported: &ExportedType) -> String {
    match exported.mime() {
        Some(mime) => format!("mimeType = '{mime}'"),
        // Binary means "anything that is not a native drive document".
        None => format!("not mimeType contains '{DRIVE_DOCS_MIME_PREFIX}'"),
    }
}
