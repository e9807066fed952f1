// src/services/fetcher.rs

//! Document fetching.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::utils::http;

/// Source of raw listing markup.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP with the configured User-Agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        http::fetch_text(&self.client, url)
            .await
            .map_err(|e| AppError::fetch(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_from_default_source() {
        assert!(HttpFetcher::new(&SourceConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let config = SourceConfig {
            timeout_secs: 1,
            ..SourceConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }
}
