//! Jikan API v4 client with rate limiting.

use super::http::HttpTransport;
use super::rate_limiter::RateLimiter;
use super::types::*;
use super::CatalogProvider;
use crate::error::{UpstreamError, UpstreamStatus};
use anyhow::Result;
use async_trait::async_trait;
use shared::config::CatalogConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const PROVIDER: &str = "jikan";

/// Jikan API v4 client
pub struct JikanClient {
    /// HTTP transport
    transport: HttpTransport,
    /// Base URL for Jikan API
    base_url: String,
    /// Rate limiter
    rate_limiter: RateLimiter,
    /// Longest wait for a rate-limit slot
    timeout: Duration,
}

impl JikanClient {
    /// Create a new Jikan client
    pub fn new(
        base_url: String,
        timeout: Duration,
        requests_per_second: f64,
        requests_per_minute: u32,
    ) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(PROVIDER, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(requests_per_second, requests_per_minute),
            timeout,
        })
    }

    /// Create a client from the `[catalog]` config section
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
            config.rate_limit.requests_per_second,
            config.rate_limit.requests_per_minute,
        )
    }

    /// Make a rate-limited GET request
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint);

        // Apply rate limiting before each request
        if !self.rate_limiter.acquire_within(self.timeout).await {
            warn!(url = %url, "Rate limit wait exceeded request timeout");
            return Err(UpstreamError::new(
                PROVIDER,
                UpstreamStatus::Timeout,
                "rate limit wait exceeded request timeout",
            ));
        }

        self.transport.get_json(&url, query).await
    }
}

#[async_trait]
impl CatalogProvider for JikanClient {
    async fn top_anime(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<TopAnimeEntry>, UpstreamError> {
        info!(page = page, limit = limit, "Fetching top anime");
        self.get(
            "/top/anime",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn episodes(
        &self,
        anime_id: u64,
        page: u32,
    ) -> Result<PaginatedResponse<EpisodeEntry>, UpstreamError> {
        debug!(anime_id = anime_id, page = page, "Fetching anime episodes");
        self.get(
            &format!("/anime/{}/episodes", anime_id),
            &[("page", page.to_string())],
        )
        .await
    }
}
