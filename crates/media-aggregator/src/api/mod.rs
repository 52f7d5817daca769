//! Upstream provider clients.
//!
//! One client per provider family. Each issues a single bounded-timeout
//! HTTP call per method and returns the provider's own payload types or an
//! [`UpstreamError`]. The traits below are the seams the query service is
//! built against.

pub mod anilist;
pub mod feeds;
pub mod http;
pub mod jikan;
pub mod mangadex;
pub mod rate_limiter;
pub mod types;

pub use anilist::AniListClient;
pub use feeds::RssFeedClient;
pub use http::HttpTransport;
pub use jikan::JikanClient;
pub use mangadex::MangaDexClient;
pub use rate_limiter::RateLimiter;
pub use types::*;

use crate::error::UpstreamError;
use async_trait::async_trait;
use uuid::Uuid;

/// Anime metadata (GraphQL) provider
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search anime by free text
    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<anilist::SearchPage, UpstreamError>;

    /// Look up one anime with its relations; `None` when it does not exist
    async fn media(&self, id: u64) -> Result<Option<anilist::AniListMedia>, UpstreamError>;
}

/// Anime catalog (REST) provider
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Top anime, `limit` items per page
    async fn top_anime(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<TopAnimeEntry>, UpstreamError>;

    /// Episode listing; the provider serves a fixed number per page
    async fn episodes(
        &self,
        anime_id: u64,
        page: u32,
    ) -> Result<PaginatedResponse<EpisodeEntry>, UpstreamError>;
}

/// Manga catalog provider
#[async_trait]
pub trait MangaProvider: Send + Sync {
    async fn search(
        &self,
        title: &str,
        offset: usize,
        limit: usize,
    ) -> Result<mangadex::MangaCollection, UpstreamError>;

    /// `None` when the manga does not exist
    async fn manga(&self, id: &Uuid) -> Result<Option<mangadex::MangaData>, UpstreamError>;
}

/// A single news feed
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Label attached to every item from this feed
    fn label(&self) -> &str;

    /// Raw feed document
    async fn fetch(&self) -> Result<Vec<u8>, UpstreamError>;
}
