use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::ingest::types::{SourceProvider, SourceText};

/// Reads a local file. The snapshot is named after the file name.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    display: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let display = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());
        Self { path, display }
    }
}

#[async_trait]
impl SourceProvider for FileSource {
    async fn fetch_text(&self) -> Result<SourceText> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        Ok(SourceText {
            name: self.display.clone(),
            body,
        })
    }

    fn name(&self) -> &str {
        &self.display
    }
}
