use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::types::{SourceProvider, SourceText};

/// Fetches a remote sheet (e.g. a published sample). Non-2xx is a failure.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SourceProvider for HttpSource {
    async fn fetch_text(&self) -> Result<SourceText> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {}", self.url))?;
        let body = resp.text().await.context("reading response body")?;
        Ok(SourceText {
            name: self.url.clone(),
            body,
        })
    }

    fn name(&self) -> &str {
        &self.url
    }
}
