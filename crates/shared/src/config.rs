//! Configuration management for the media aggregation gateway.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Anime metadata GraphQL provider
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Anime catalog REST provider
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Manga catalog provider
    #[serde(default)]
    pub manga: MangaConfig,

    /// News feed settings
    #[serde(default)]
    pub feeds: FeedsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live of every cached result in seconds (0 disables caching)
    pub ttl_seconds: u64,
}

/// GraphQL metadata provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// REST catalog provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// API base URL
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Largest `limit` accepted by list endpoints
    pub max_page_size: u32,

    /// Fixed number of items on an episode page
    pub episodes_page_size: u32,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: f64,

    /// Maximum requests per minute
    pub requests_per_minute: u32,
}

/// Manga catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaConfig {
    /// API base URL
    pub base_url: String,

    /// Base URL cover file names are resolved against
    pub cover_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Largest `limit` accepted by the collection endpoint
    pub max_page_size: u32,
}

/// News feed aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Per-feed timeout in seconds
    pub timeout_seconds: u64,

    /// Maximum number of merged articles returned
    pub max_items: usize,

    /// Feeds to aggregate, in tie-break order
    pub sources: Vec<FeedSourceConfig>,
}

/// A single news feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSourceConfig {
    /// Label attached to every item from this feed
    pub label: String,

    /// Feed URL (RSS, Atom or JSON Feed)
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 600 }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://graphql.anilist.co".to_string(),
            timeout_seconds: 12,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            timeout_seconds: 12,
            max_page_size: 25,
            episodes_page_size: 100,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 3.0,
            requests_per_minute: 60,
        }
    }
}

impl Default for MangaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mangadex.org".to_string(),
            cover_base_url: "https://uploads.mangadex.org/covers".to_string(),
            timeout_seconds: 12,
            max_page_size: 100,
        }
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        let source = |label: &str, url: &str| FeedSourceConfig {
            label: label.to_string(),
            url: url.to_string(),
        };

        Self {
            timeout_seconds: 15,
            max_items: 40,
            sources: vec![
                source(
                    "Anime News Network",
                    "https://www.animenewsnetwork.com/all/rss.xml?ann-edition=us",
                ),
                source("MyAnimeList", "https://myanimelist.net/rss/news.xml"),
                source(
                    "Crunchyroll",
                    "https://cr-news-api-service.prd.crunchyrollsvc.com/v1/en-US/rss",
                ),
            ],
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Get the cache time-to-live
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }

    /// Get the `host:port` the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_seconds, 600);
        assert_eq!(config.catalog.max_page_size, 25);
        assert_eq!(config.catalog.episodes_page_size, 100);
        assert_eq!(config.feeds.max_items, 40);
        assert_eq!(config.feeds.sources.len(), 3);
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_serialized_defaults_load_back() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let original_config = Config::default();
        std::fs::write(&config_path, toml::to_string_pretty(&original_config)?)?;

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.metadata.endpoint, original_config.metadata.endpoint);
        assert_eq!(loaded_config.feeds.sources, original_config.feeds.sources);

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_section_defaults() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [cache]
            ttl_seconds = 30
            "#,
        )?;

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.cache.ttl_seconds, 30);
        assert_eq!(config.catalog.base_url, "https://api.jikan.moe/v4");
        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config.server.port, 8080);
    }
}
