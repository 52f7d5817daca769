//! Media aggregation gateway library.
//!
//! Answers anime, manga and news queries by fanning out to upstream
//! providers (a GraphQL metadata API, a rate-limited REST catalog, a manga
//! catalog and RSS/Atom feeds), normalizing their payloads into one record
//! shape and caching results in memory with a fixed TTL.

pub mod api;
pub mod cache;
pub mod error;
pub mod feeds;
pub mod http;
pub mod keys;
pub mod normalize;
pub mod service;
pub mod sources;
pub mod stitcher;

pub use api::{AniListClient, JikanClient, MangaDexClient, RateLimiter, RssFeedClient};
pub use cache::TtlCache;
pub use error::{NormalizeError, QueryError, QueryResult, UpstreamError, UpstreamStatus};
pub use feeds::FeedAggregator;
pub use http::{router, AppState};
pub use keys::CacheKey;
pub use service::{CachedResult, Providers, QueryService, ServiceSettings};
pub use stitcher::{Page, PageRequest, PageStitcher, PagedSource};
