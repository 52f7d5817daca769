//! Query orchestration.
//!
//! Every operation follows the same path: validate input, build the cache
//! key, return a fresh cached result if there is one, otherwise resolve the
//! upstream (stitching pages where needed), normalize, store and return.
//! Invalid input is rejected before the cache or any provider is touched,
//! and failures are never cached.

use crate::api::{CatalogProvider, MangaProvider, MetadataProvider};
use crate::cache::TtlCache;
use crate::error::{QueryError, QueryResult, UpstreamError};
use crate::feeds::FeedAggregator;
use crate::keys::CacheKey;
use crate::normalize::{anilist, jikan, mangadex};
use crate::sources::{EpisodeSource, MangaSearchSource, TopAnimeSource};
use crate::stitcher::PageStitcher;
use chrono::Utc;
use shared::{Config, EpisodePage, EpisodePagination, MediaPage, MediaRecord, NewsDigest};
use std::future::Future;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Highest page number accepted by any paged operation
pub const MAX_PAGE: u32 = 10_000;

pub const SEARCH_LIMITS: RangeInclusive<u32> = 1..=50;
pub const TOP_LIMITS: RangeInclusive<u32> = 1..=500;
pub const EPISODE_LIMITS: RangeInclusive<u32> = 1..=100;
pub const MANGA_LIMITS: RangeInclusive<u32> = 1..=200;

/// The manga provider serves no items past this offset
pub const MANGA_WINDOW: usize = 10_000;

/// Normalized result as stored in the cache
#[derive(Debug, Clone)]
pub enum CachedResult {
    Record(MediaRecord),
    Records(MediaPage),
    Episodes(EpisodePage),
    News(NewsDigest),
}

/// Conversion between an operation's result type and its cached form
trait Cacheable: Clone + Sized {
    fn into_cached(self) -> CachedResult;
    fn from_cached(cached: CachedResult) -> Option<Self>;
}

macro_rules! cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            fn into_cached(self) -> CachedResult {
                CachedResult::$variant(self)
            }

            fn from_cached(cached: CachedResult) -> Option<Self> {
                match cached {
                    CachedResult::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(MediaRecord, Record);
cacheable!(MediaPage, Records);
cacheable!(EpisodePage, Episodes);
cacheable!(NewsDigest, News);

/// Upstream clients the service queries
pub struct Providers {
    pub metadata: Arc<dyn MetadataProvider>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub manga: Arc<dyn MangaProvider>,
    pub feeds: FeedAggregator,
}

/// Provider page geometry
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub catalog_page_size: usize,
    pub episodes_page_size: usize,
    pub manga_page_size: usize,
    pub cover_base_url: String,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            catalog_page_size: config.catalog.max_page_size as usize,
            episodes_page_size: config.catalog.episodes_page_size as usize,
            manga_page_size: config.manga.max_page_size as usize,
            cover_base_url: config.manga.cover_base_url.clone(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Cached, validated access to every upstream provider
pub struct QueryService {
    cache: TtlCache<CacheKey, CachedResult>,
    metadata: Arc<dyn MetadataProvider>,
    catalog: Arc<dyn CatalogProvider>,
    manga: Arc<dyn MangaProvider>,
    feeds: FeedAggregator,
    settings: ServiceSettings,
}

fn require_query(query: &str) -> QueryResult<String> {
    let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        return Err(QueryError::InvalidInput("query text must not be empty".to_string()));
    }
    Ok(query)
}

fn require_id(id: u64) -> QueryResult<u64> {
    if id == 0 {
        return Err(QueryError::InvalidInput("id must be a positive integer".to_string()));
    }
    Ok(id)
}

fn require_window(page: u32, limit: u32, limits: &RangeInclusive<u32>) -> QueryResult<usize> {
    if !(1..=MAX_PAGE).contains(&page) {
        return Err(QueryError::InvalidInput(format!(
            "page must be between 1 and {}",
            MAX_PAGE
        )));
    }
    if !limits.contains(&limit) {
        return Err(QueryError::InvalidInput(format!(
            "limit must be between {} and {}",
            limits.start(),
            limits.end()
        )));
    }
    Ok((page as usize - 1) * limit as usize)
}

/// Upstream 404 becomes NotFound; everything else stays an upstream failure
fn not_found_or(err: UpstreamError, what: impl FnOnce() -> String) -> QueryError {
    if err.is_not_found() {
        QueryError::NotFound(what())
    } else {
        QueryError::Upstream(err)
    }
}

impl QueryService {
    pub fn new(cache: TtlCache<CacheKey, CachedResult>, providers: Providers, settings: ServiceSettings) -> Self {
        Self {
            cache,
            metadata: providers.metadata,
            catalog: providers.catalog,
            manga: providers.manga,
            feeds: providers.feeds,
            settings,
        }
    }

    /// Number of entries currently held in the cache
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    async fn cached<T, F>(&self, key: CacheKey, fetch: F) -> QueryResult<T>
    where
        T: Cacheable,
        F: Future<Output = QueryResult<T>>,
    {
        if let Some(hit) = self.cache.get(&key).and_then(T::from_cached) {
            return Ok(hit);
        }

        match fetch.await {
            Ok(value) => {
                self.cache.set(key, value.clone().into_cached());
                Ok(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Query failed");
                Err(e)
            }
        }
    }

    /// Free-text anime search on the metadata provider
    pub async fn search_anime(&self, query: &str, page: u32, limit: u32) -> QueryResult<MediaPage> {
        let query = require_query(query)?;
        require_window(page, limit, &SEARCH_LIMITS)?;
        let key = CacheKey::new("metadata.search", &query, page, limit);

        self.cached(key, self.fetch_anime_search(&query, page, limit)).await
    }

    async fn fetch_anime_search(&self, query: &str, page: u32, limit: u32) -> QueryResult<MediaPage> {
        let result = self.metadata.search(query, page, limit).await?;
        let normalized = anilist::normalize_search(result);
        info!(query = %query, results = normalized.items.len(), "Anime search resolved");
        Ok(normalized)
    }

    /// One anime with its related media
    pub async fn anime_details(&self, id: u64) -> QueryResult<MediaRecord> {
        let id = require_id(id)?;
        let key = CacheKey::new("metadata.details", &id.to_string(), 0, 0);

        self.cached(key, self.fetch_anime_details(id)).await
    }

    async fn fetch_anime_details(&self, id: u64) -> QueryResult<MediaRecord> {
        let media = self
            .metadata
            .media(id)
            .await
            .map_err(|e| not_found_or(e, || format!("anime {}", id)))?
            .ok_or_else(|| QueryError::NotFound(format!("anime {}", id)))?;

        anilist::normalize_details(media).map_err(|e| QueryError::Upstream(e.into()))
    }

    /// Top anime list, stitched across catalog pages
    pub async fn top_anime(&self, page: u32, limit: u32) -> QueryResult<MediaPage> {
        let offset = require_window(page, limit, &TOP_LIMITS)?;
        let key = CacheKey::new("catalog.top", "", page, limit);

        self.cached(key, self.fetch_top_anime(offset, limit as usize)).await
    }

    async fn fetch_top_anime(&self, offset: usize, limit: usize) -> QueryResult<MediaPage> {
        let source = TopAnimeSource::new(self.catalog.clone(), self.settings.catalog_page_size);
        let stitched = PageStitcher::new(self.settings.catalog_page_size)
            .collect(&source, offset, limit)
            .await?;

        debug!(pages = stitched.pages, items = stitched.items.len(), "Top list stitched");
        let items = jikan::normalize_top(stitched.items);
        Ok(MediaPage {
            total: stitched.total.unwrap_or(items.len() as u64),
            items,
        })
    }

    /// Episode listing window, numbered by position
    pub async fn episodes(&self, anime_id: u64, page: u32, limit: u32) -> QueryResult<EpisodePage> {
        let anime_id = require_id(anime_id)?;
        require_window(page, limit, &EPISODE_LIMITS)?;
        let key = CacheKey::new("catalog.episodes", &anime_id.to_string(), page, limit);

        self.cached(key, self.fetch_episodes(anime_id, page, limit)).await
    }

    async fn fetch_episodes(&self, anime_id: u64, page: u32, limit: u32) -> QueryResult<EpisodePage> {
        let offset = (page as usize - 1) * limit as usize;
        let source = EpisodeSource::new(self.catalog.clone(), anime_id, self.settings.episodes_page_size);
        let stitched = PageStitcher::new(self.settings.episodes_page_size)
            .collect(&source, offset, limit as usize)
            .await
            .map_err(|e| not_found_or(e, || format!("anime {}", anime_id)))?;

        Ok(EpisodePage {
            episodes: jikan::normalize_episodes(stitched.items, page, limit),
            pagination: EpisodePagination {
                page,
                limit,
                has_next_page: stitched.has_more,
            },
        })
    }

    /// Manga title search, stitched across catalog windows
    pub async fn search_manga(&self, query: &str, page: u32, limit: u32) -> QueryResult<MediaPage> {
        let query = require_query(query)?;
        let offset = require_window(page, limit, &MANGA_LIMITS)?;
        if offset + limit as usize > MANGA_WINDOW {
            return Err(QueryError::InvalidInput(format!(
                "manga search cannot go past result {}",
                MANGA_WINDOW
            )));
        }
        let key = CacheKey::new("manga.search", &query, page, limit);

        self.cached(key, self.fetch_manga_search(&query, offset, limit as usize)).await
    }

    async fn fetch_manga_search(&self, query: &str, offset: usize, limit: usize) -> QueryResult<MediaPage> {
        let source = MangaSearchSource::new(self.manga.clone(), query);
        let stitched = PageStitcher::new(self.settings.manga_page_size)
            .collect(&source, offset, limit)
            .await?;

        let items = mangadex::normalize_collection(stitched.items, &self.settings.cover_base_url);
        info!(query = %query, results = items.len(), "Manga search resolved");
        Ok(MediaPage {
            total: stitched.total.unwrap_or(items.len() as u64),
            items,
        })
    }

    /// One manga by catalog UUID
    pub async fn manga_details(&self, id: &str) -> QueryResult<MediaRecord> {
        let id = Uuid::parse_str(id.trim())
            .map_err(|_| QueryError::InvalidInput(format!("invalid manga id: {}", id)))?;
        let key = CacheKey::new("manga.details", &id.to_string(), 0, 0);

        self.cached(key, self.fetch_manga_details(id)).await
    }

    async fn fetch_manga_details(&self, id: Uuid) -> QueryResult<MediaRecord> {
        let data = self
            .manga
            .manga(&id)
            .await
            .map_err(|e| not_found_or(e, || format!("manga {}", id)))?
            .ok_or_else(|| QueryError::NotFound(format!("manga {}", id)))?;

        mangadex::normalize_manga(data, &self.settings.cover_base_url)
            .map_err(|e| QueryError::Upstream(e.into()))
    }

    /// Merged news digest; individual feed failures only shrink the list
    pub async fn news(&self) -> QueryResult<NewsDigest> {
        self.cached(CacheKey::singleton("feeds.news"), self.fetch_news()).await
    }

    async fn fetch_news(&self) -> QueryResult<NewsDigest> {
        Ok(NewsDigest {
            articles: self.feeds.aggregate().await,
            updated: Utc::now(),
        })
    }
}
