//! Data models for the project.
//!
//! This module defines the unified result shapes every upstream provider is
//! normalized into: media records (anime and manga), episode records and
//! news items, plus the page envelopes returned to HTTP callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a normalized record.
///
/// Anime providers use numeric ids, the manga catalog uses UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Numeric(u64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Numeric(id) => write!(f, "{}", id),
            RecordId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// Kind of media a record describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Anime,
    Manga,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Anime => write!(f, "anime"),
            MediaKind::Manga => write!(f, "manga"),
        }
    }
}

/// Localized title variants as reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleVariants {
    pub english: Option<String>,
    pub romanized: Option<String>,
    pub native: Option<String>,
}

impl TitleVariants {
    /// Resolve the display title: english, then romanized, then native.
    ///
    /// Blank variants are skipped. Returns `None` only when every variant is
    /// missing or blank.
    pub fn display(&self) -> Option<String> {
        [&self.english, &self.romanized, &self.native]
            .into_iter()
            .flatten()
            .map(|t| t.trim())
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }
}

/// Trailer reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trailer {
    pub site: String,
    pub id: String,
    pub url: Option<String>,
}

/// Link to another media entry (sequel, adaptation, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedMedia {
    pub id: RecordId,
    pub relation: String,
    pub title: String,
    pub kind: Option<MediaKind>,
    pub format: Option<String>,
    pub cover_image: Option<String>,
}

/// Unified anime/manga record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: RecordId,
    pub kind: MediaKind,

    // Titles
    pub title: String,
    pub titles: TitleVariants,

    // Type and status
    pub format: Option<String>,
    pub status: Option<String>,
    pub year: Option<i32>,

    // Length
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub duration_minutes: Option<u32>,

    // Scores and rankings
    pub score: Option<f64>,
    pub popularity: Option<u64>,

    // Classifications (always arrays, possibly empty)
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub authors: Vec<String>,
    pub artists: Vec<String>,

    pub synopsis: Option<String>,

    // Images
    pub cover_image: Option<String>,
    pub banner_image: Option<String>,

    pub trailer: Option<Trailer>,

    /// Present on detail lookups only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<RelatedMedia>>,
}

/// Episode with a sequential number computed from its page position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub id: u64,
    pub number: u32,
    pub title: String,
    pub title_romanized: Option<String>,
    pub title_native: Option<String>,
    pub aired: Option<DateTime<Utc>>,
    pub score: Option<f64>,
    pub filler: bool,
    pub recap: bool,
}

/// News article taken from one of the configured feeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub thumbnail: Option<String>,
    pub description: String,
    pub source: String,
}

/// `{ items, total }` envelope for media listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPage {
    pub items: Vec<MediaRecord>,
    pub total: u64,
}

/// Pagination block of an episode listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodePagination {
    pub page: u32,
    pub limit: u32,
    pub has_next_page: bool,
}

/// `{ episodes, pagination }` envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodePage {
    pub episodes: Vec<EpisodeRecord>,
    pub pagination: EpisodePagination,
}

/// `{ articles, updated }` envelope for the aggregated news feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDigest {
    pub articles: Vec<NewsItem>,
    pub updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants(english: &str, romanized: &str, native: &str) -> TitleVariants {
        let opt = |s: &str| Some(s.to_string());
        TitleVariants {
            english: opt(english),
            romanized: opt(romanized),
            native: opt(native),
        }
    }

    #[test]
    fn test_display_title_prefers_english() {
        let titles = variants("Attack on Titan", "Shingeki no Kyojin", "進撃の巨人");
        assert_eq!(titles.display().as_deref(), Some("Attack on Titan"));
    }

    #[test]
    fn test_display_title_skips_empty_english() {
        let titles = variants("", "Shingeki", "進撃");
        assert_eq!(titles.display().as_deref(), Some("Shingeki"));
    }

    #[test]
    fn test_display_title_falls_back_to_native() {
        let titles = TitleVariants {
            english: None,
            romanized: Some("   ".to_string()),
            native: Some("進撃".to_string()),
        };
        assert_eq!(titles.display().as_deref(), Some("進撃"));
    }

    #[test]
    fn test_display_title_absent() {
        assert_eq!(TitleVariants::default().display(), None);
    }

    #[test]
    fn test_record_id_serializes_untagged() {
        assert_eq!(serde_json::to_string(&RecordId::Numeric(16498)).unwrap(), "16498");
        assert_eq!(
            serde_json::to_string(&RecordId::Text("a1c7c817".to_string())).unwrap(),
            "\"a1c7c817\""
        );
    }

    #[test]
    fn test_media_kind_from_str() {
        assert_eq!("Manga".parse::<MediaKind>().unwrap(), MediaKind::Manga);
        assert!("novel".parse::<MediaKind>().is_err());
    }
}
