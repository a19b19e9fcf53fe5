// src/ingest/types.rs
use anyhow::Result;
use std::sync::Arc;

/// Raw text of one tabular source, exactly as fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub name: String, // e.g. "sample.csv", "https://host/stats.csv"
    pub body: String,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_text(&self) -> Result<SourceText>;
    fn name(&self) -> &str;
}

/// One row as received. Cells are stored verbatim and never rewritten.
///
/// `headers` is shared with the owning [`RawTable`]; `cells[i]` belongs to
/// `headers[i]`. Ragged rows may be shorter (missing cells are absent) or longer
/// (extra cells are kept for export but unreachable by name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    headers: Arc<[String]>,
    cells: Vec<String>,
}

impl RawRow {
    pub fn new(headers: Arc<[String]>, cells: Vec<String>) -> Self {
        Self { headers, cells }
    }

    /// Cell under the first header whose trimmed name equals `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h.trim() == column)?;
        self.cells.get(idx).map(String::as_str)
    }

    /// First column among `columns` holding a non-blank cell.
    pub fn first_present(&self, columns: &[&str]) -> Option<&str> {
        columns
            .iter()
            .filter_map(|c| self.get(c))
            .find(|v| !v.trim().is_empty())
    }

    /// Trimmed `Bot` cell, if non-empty.
    pub fn name(&self) -> Option<&str> {
        self.get(super::COL_BOT)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// Header plus rows of one ingested batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Arc<[String]>,
    pub rows: Vec<RawRow>,
    pub delimiter: u8,
}
