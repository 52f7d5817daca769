//! [`PagedSource`] adapters over the provider clients.
//!
//! The catalog provider is page-numbered with a capped page size, the manga
//! provider is offset-addressed. Both are exposed to the stitcher as
//! `(offset, size)` windows.

use crate::api::mangadex::MangaData;
use crate::api::types::{EpisodeEntry, PaginatedResponse};
use crate::api::{CatalogProvider, MangaProvider, TopAnimeEntry};
use crate::error::UpstreamError;
use crate::stitcher::{Page, PageRequest, PagedSource};
use async_trait::async_trait;
use std::sync::Arc;

/// Slice `size` items at `skip` out of a full provider page
fn slice_page<T>(response: PaginatedResponse<T>, skip: usize, size: usize) -> Page<T> {
    let available = response.data.len();
    let items: Vec<T> = response.data.into_iter().skip(skip).take(size).collect();
    let has_more = response.pagination.has_next_page || skip + items.len() < available;

    Page {
        items,
        has_more,
        total: response.pagination.items.map(|i| i.total),
    }
}

/// Top anime list
pub struct TopAnimeSource {
    provider: Arc<dyn CatalogProvider>,
    page_size: usize,
}

impl TopAnimeSource {
    pub fn new(provider: Arc<dyn CatalogProvider>, page_size: usize) -> Self {
        Self {
            provider,
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl PagedSource for TopAnimeSource {
    type Item = TopAnimeEntry;

    async fn fetch(&self, request: PageRequest) -> Result<Page<TopAnimeEntry>, UpstreamError> {
        let size = request.size.clamp(1, self.page_size);

        if request.offset % size == 0 {
            // Window lines up with a page of `size` items
            let page = (request.offset / size + 1) as u32;
            let response = self.provider.top_anime(page, size as u32).await?;
            return Ok(slice_page(response, 0, size));
        }

        let page = (request.offset / self.page_size + 1) as u32;
        let skip = request.offset % self.page_size;
        let response = self.provider.top_anime(page, self.page_size as u32).await?;
        Ok(slice_page(response, skip, size))
    }
}

/// Episode listing of one anime; the provider serves fixed-size pages.
///
/// A window is read from the provider page containing its offset and never
/// extends past that page's end.
pub struct EpisodeSource {
    provider: Arc<dyn CatalogProvider>,
    anime_id: u64,
    page_size: usize,
}

impl EpisodeSource {
    pub fn new(provider: Arc<dyn CatalogProvider>, anime_id: u64, page_size: usize) -> Self {
        Self {
            provider,
            anime_id,
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl PagedSource for EpisodeSource {
    type Item = EpisodeEntry;

    async fn fetch(&self, request: PageRequest) -> Result<Page<EpisodeEntry>, UpstreamError> {
        let page = (request.offset / self.page_size + 1) as u32;
        let skip = request.offset % self.page_size;
        let response = self.provider.episodes(self.anime_id, page).await?;
        Ok(slice_page(response, skip, request.size))
    }
}

/// Manga title search
pub struct MangaSearchSource {
    provider: Arc<dyn MangaProvider>,
    title: String,
}

impl MangaSearchSource {
    pub fn new(provider: Arc<dyn MangaProvider>, title: impl Into<String>) -> Self {
        Self {
            provider,
            title: title.into(),
        }
    }
}

#[async_trait]
impl PagedSource for MangaSearchSource {
    type Item = MangaData;

    async fn fetch(&self, request: PageRequest) -> Result<Page<MangaData>, UpstreamError> {
        let collection = self
            .provider
            .search(&self.title, request.offset, request.size)
            .await?;
        let has_more = collection.has_more();

        Ok(Page {
            total: Some(collection.total),
            items: collection.data,
            has_more,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory providers shared by the adapter and service tests.

    use super::*;
    use crate::api::anilist::{AniListMedia, SearchPage};
    use crate::api::mangadex::MangaCollection;
    use crate::api::types::{Pagination, PaginationItems};
    use crate::api::MetadataProvider;
    use crate::error::UpstreamStatus;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Catalog with `total` top entries and `episodes` episodes per anime
    pub struct FakeCatalog {
        pub total: usize,
        pub episodes: usize,
        pub episode_page_size: usize,
        pub calls: Mutex<Vec<(String, u32, u32)>>,
        pub fail: bool,
    }

    impl FakeCatalog {
        pub fn new(total: usize, episodes: usize) -> Self {
            Self {
                total,
                episodes,
                episode_page_size: 100,
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn window<T>(
            total: usize,
            page: u32,
            limit: u32,
            make: impl Fn(usize) -> T,
        ) -> PaginatedResponse<T> {
            let start = (page as usize - 1) * limit as usize;
            let end = (start + limit as usize).min(total);
            let data = (start.min(end)..end).map(make).collect();
            PaginatedResponse {
                data,
                pagination: Pagination {
                    last_visible_page: ((total + limit as usize - 1) / limit as usize) as u32,
                    has_next_page: end < total,
                    current_page: Some(page),
                    items: Some(PaginationItems {
                        count: (end - start.min(end)) as u32,
                        total: total as u64,
                        per_page: limit,
                    }),
                },
            }
        }
    }

    pub fn top_entry(rank: usize) -> TopAnimeEntry {
        serde_json::from_value(json!({
            "mal_id": rank as u64 + 1000,
            "title": format!("Anime {}", rank),
            "rank": rank as u32
        }))
        .unwrap()
    }

    #[async_trait]
    impl CatalogProvider for FakeCatalog {
        async fn top_anime(
            &self,
            page: u32,
            limit: u32,
        ) -> Result<PaginatedResponse<TopAnimeEntry>, UpstreamError> {
            self.calls.lock().unwrap().push(("top".to_string(), page, limit));
            if self.fail {
                return Err(UpstreamError::new("jikan", UpstreamStatus::Http(503), "down"));
            }
            Ok(Self::window(self.total, page, limit, |i| top_entry(i + 1)))
        }

        async fn episodes(
            &self,
            anime_id: u64,
            page: u32,
        ) -> Result<PaginatedResponse<EpisodeEntry>, UpstreamError> {
            self.calls
                .lock()
                .unwrap()
                .push(("episodes".to_string(), page, self.episode_page_size as u32));
            if self.fail {
                return Err(UpstreamError::new("jikan", UpstreamStatus::Timeout, "slow"));
            }
            if anime_id == 404 {
                return Err(UpstreamError::new("jikan", UpstreamStatus::Http(404), "Not Found"));
            }
            let mut response = Self::window(self.episodes, page, self.episode_page_size as u32, |i| {
                serde_json::from_value(json!({ "mal_id": i as u64 + 1, "title": format!("Episode title {}", i + 1) }))
                    .unwrap()
            });
            response.pagination.items = None;
            Ok(response)
        }
    }

    /// Metadata provider that counts calls
    #[derive(Default)]
    pub struct SpyMetadata {
        pub search_calls: AtomicUsize,
        pub media_calls: AtomicUsize,
    }

    impl SpyMetadata {
        pub fn searches(&self) -> usize {
            self.search_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataProvider for SpyMetadata {
        async fn search(&self, query: &str, _page: u32, _per_page: u32) -> Result<SearchPage, UpstreamError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            if query.contains("fail") {
                return Err(UpstreamError::new("anilist", UpstreamStatus::Network, "refused"));
            }
            let media: AniListMedia = serde_json::from_value(json!({
                "id": 16498,
                "title": { "english": "Attack on Titan", "romaji": "Shingeki no Kyojin" }
            }))
            .unwrap();
            Ok(SearchPage {
                media: vec![media],
                total: 1,
                has_next_page: false,
            })
        }

        async fn media(&self, id: u64) -> Result<Option<AniListMedia>, UpstreamError> {
            self.media_calls.fetch_add(1, Ordering::SeqCst);
            match id {
                404 => Ok(None),
                500 => Err(UpstreamError::new("anilist", UpstreamStatus::Http(500), "oops")),
                _ => Ok(Some(
                    serde_json::from_value(json!({
                        "id": id,
                        "title": { "romaji": "Shingeki no Kyojin" },
                        "relations": { "edges": [] }
                    }))
                    .unwrap(),
                )),
            }
        }
    }

    /// Manga catalog of `total` numbered entries
    pub struct FakeManga {
        pub total: usize,
        pub calls: Mutex<Vec<(usize, usize)>>,
    }

    impl FakeManga {
        pub fn new(total: usize) -> Self {
            Self {
                total,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MangaProvider for FakeManga {
        async fn search(
            &self,
            _title: &str,
            offset: usize,
            limit: usize,
        ) -> Result<MangaCollection, UpstreamError> {
            self.calls.lock().unwrap().push((offset, limit));
            let end = (offset + limit).min(self.total);
            let data = (offset.min(end)..end)
                .map(|i| {
                    serde_json::from_value(json!({
                        "id": format!("manga-{}", i),
                        "attributes": { "title": { "en": format!("Manga {}", i) } }
                    }))
                    .unwrap()
                })
                .collect();
            Ok(MangaCollection {
                data,
                limit: limit as u32,
                offset: offset as u32,
                total: self.total as u64,
            })
        }

        async fn manga(&self, id: &Uuid) -> Result<Option<MangaData>, UpstreamError> {
            if id.is_nil() {
                return Ok(None);
            }
            Ok(Some(
                serde_json::from_value(json!({
                    "id": id.to_string(),
                    "attributes": { "title": { "en": "One Piece" }, "originalLanguage": "ja" }
                }))
                .unwrap(),
            ))
        }
    }
}
