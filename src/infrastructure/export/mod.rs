//! Export encodings of a result set.
//!
//! Both encodings use the record field names as column/key names, in record
//! field order, with timestamps as RFC 3339 strings. Each has a reader so an
//! exported file can be loaded back for review.

pub mod csv;
pub mod json;

pub use self::csv::{read_csv, write_csv};
pub use self::json::{read_json, write_json};

/// Download metadata for one encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "test_cases.csv",
            ExportFormat::Json => "test_cases.json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}
