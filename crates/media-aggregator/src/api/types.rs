//! Jikan API v4 response types.
//!
//! These types represent the JSON responses of the REST catalog provider.
//! Everything the provider may omit or null is optional or defaulted.

use serde::{Deserialize, Serialize};

/// Generic pagination wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Pagination metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub last_visible_page: u32,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub items: Option<PaginationItems>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationItems {
    pub count: u32,
    pub total: u64,
    pub per_page: u32,
}

/// Top anime entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopAnimeEntry {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Option<AnimeImages>,
    #[serde(default)]
    pub trailer: Option<TrailerInfo>,

    // Titles
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,

    // Type and status
    #[serde(rename = "type", default)]
    pub anime_type: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,

    // Scores and rankings
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub members: Option<u64>,

    #[serde(default)]
    pub synopsis: Option<String>,

    // Classifications; Jikan sends `null` for some of these on sparse entries
    #[serde(default)]
    pub genres: Option<Vec<MalEntity>>,
    #[serde(default)]
    pub themes: Option<Vec<MalEntity>>,
    #[serde(default)]
    pub studios: Option<Vec<MalEntity>>,
}

/// Anime episode as listed on `/anime/{id}/episodes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeEntry {
    /// Upstream ordinal; not trusted for numbering
    pub mal_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_romanji: Option<String>,
    #[serde(default)]
    pub aired: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub filler: bool,
    #[serde(default)]
    pub recap: bool,
}

/// Anime images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeImages {
    #[serde(default)]
    pub jpg: Option<ImageSet>,
    #[serde(default)]
    pub webp: Option<ImageSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSet {
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
    pub large_image_url: Option<String>,
}

/// Trailer information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailerInfo {
    pub youtube_id: Option<String>,
    pub url: Option<String>,
}

/// MAL entity (genre, studio, producer, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalEntity {
    pub mal_id: u64,
    #[serde(rename = "type", default)]
    pub entity_type: Option<String>,
    pub name: String,
}
