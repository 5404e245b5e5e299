//! Spreadsheet write access (sink side).

pub mod client;

pub use client::{SheetsClient, SHEETS_API_BASE};
