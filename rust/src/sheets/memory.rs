use async_trait::async_trait;
use intervention_types::CANONICAL_HEADERS;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{align_rows, SpreadsheetSink};
use crate::error::SheetsError;

/// Process-local sheet: a fixed header row and the rows appended so far.
#[derive(Debug)]
pub struct InMemorySheet {
    name: String,
    headers: Vec<String>,
    rows: Mutex<Vec<Vec<String>>>,
}

impl InMemorySheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Sheet whose header row is the contribution template's
    pub fn with_canonical_headers(name: impl Into<String>) -> Self {
        Self::new(name, CANONICAL_HEADERS.iter().map(|h| h.to_string()).collect())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub async fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl SpreadsheetSink for InMemorySheet {
    async fn append_rows(&self, rows: &[Value]) -> Result<usize, SheetsError> {
        let aligned = align_rows(&self.headers, rows)?;
        let count = aligned.len();
        self.rows.lock().await.extend(aligned);
        tracing::debug!(sheet = %self.name, rows = count, "appended rows in memory");
        Ok(count)
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}
