//! News feed client.

use super::http::HttpTransport;
use super::FeedSource;
use crate::error::UpstreamError;
use anyhow::Result;
use async_trait::async_trait;
use shared::config::{FeedSourceConfig, FeedsConfig};
use std::time::Duration;

pub const PROVIDER: &str = "feed";

/// Fetches one RSS/Atom/JSON feed document
pub struct RssFeedClient {
    transport: HttpTransport,
    label: String,
    url: String,
}

impl RssFeedClient {
    pub fn new(label: String, url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(PROVIDER, timeout)?,
            label,
            url,
        })
    }

    /// One client per configured feed, in configuration order
    pub fn from_config(config: &FeedsConfig) -> Result<Vec<Self>> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        config
            .sources
            .iter()
            .map(|FeedSourceConfig { label, url }| Self::new(label.clone(), url.clone(), timeout))
            .collect()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for RssFeedClient {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<Vec<u8>, UpstreamError> {
        self.transport.get_bytes(&self.url).await
    }
}
