//! Spreadsheet sinks
//!
//! The append endpoint forwards contributor rows to a spreadsheet. The
//! `SpreadsheetSink` trait is the seam: production talks to Google Sheets,
//! tests and local runs use an in-memory sheet.
//!
//! Rows arrive as JSON. An object is matched to the sheet's header row by
//! column name (unknown keys are dropped, missing columns left blank); an
//! array is appended positionally.

mod google;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SheetsError;

pub use google::{
    CredentialSource, GoogleSheetsSink, ServiceAccountKey, CREDENTIALS_FILE_ENV,
    CREDENTIALS_JSON_ENV, SHEETS_API_BASE, SPREADSHEETS_SCOPE,
};
pub use memory::InMemorySheet;

#[async_trait]
pub trait SpreadsheetSink: Send + Sync {
    /// Append every row or none; returns the number appended
    async fn append_rows(&self, rows: &[Value]) -> Result<usize, SheetsError>;

    /// Short human-readable target for logs
    fn describe(&self) -> String;
}

/// Lay out one JSON row against a header row
pub fn align_row(headers: &[String], row: &Value, index: usize) -> Result<Vec<String>, SheetsError> {
    match row {
        Value::Object(map) => Ok(headers
            .iter()
            .map(|h| map.get(h).map(cell_text).unwrap_or_default())
            .collect()),
        Value::Array(cells) => Ok(cells.iter().map(cell_text).collect()),
        other => Err(SheetsError::InvalidRow {
            index,
            found: json_kind(other).to_string(),
        }),
    }
}

pub fn align_rows(headers: &[String], rows: &[Value]) -> Result<Vec<Vec<String>>, SheetsError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| align_row(headers, row, index))
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
