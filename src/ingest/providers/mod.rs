// src/ingest/providers/mod.rs
pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::ingest::types::{SourceProvider, SourceText};

/// In-memory text (tests, stdin, embedded samples).
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    body: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
impl SourceProvider for StaticSource {
    async fn fetch_text(&self) -> Result<SourceText> {
        Ok(SourceText {
            name: self.name.clone(),
            body: self.body.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Pick a provider from a location string: `http(s)://` URLs go over the
/// network, anything else is a file path.
pub fn provider_for(location: &str) -> Box<dyn SourceProvider> {
    let lower = location.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Box::new(HttpSource::new(location.trim()))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_dispatch() {
        assert_eq!(provider_for("HTTPS://x.test/a.csv").name(), "HTTPS://x.test/a.csv");
        assert_eq!(provider_for("data/sample.csv").name(), "sample.csv");
    }

    #[tokio::test]
    async fn static_source_returns_body() {
        let s = StaticSource::new("mem", "Bot\nA\n");
        let t = s.fetch_text().await.unwrap();
        assert_eq!(t.body, "Bot\nA\n");
        assert_eq!(t.name, "mem");
    }
}
