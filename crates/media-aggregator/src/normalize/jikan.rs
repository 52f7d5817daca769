//! REST catalog entries → unified records.

use super::{clean_text, non_empty};
use crate::api::jikan::PROVIDER;
use crate::api::types::{AnimeImages, EpisodeEntry, MalEntity, TopAnimeEntry, TrailerInfo};
use crate::error::NormalizeError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use shared::{EpisodeRecord, MediaKind, MediaRecord, RecordId, TitleVariants, Trailer};
use tracing::warn;

static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*hr").unwrap());
static MINUTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*min").unwrap());

fn capture_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Minutes in a duration string such as `"24 min per ep"` or `"1 hr 30 min"`
pub fn parse_duration_minutes(duration: &str) -> Option<u32> {
    match (
        capture_number(&HOURS_RE, duration),
        capture_number(&MINUTES_RE, duration),
    ) {
        (None, None) => None,
        (hours, minutes) => Some(
            hours
                .unwrap_or(0)
                .saturating_mul(60)
                .saturating_add(minutes.unwrap_or(0)),
        ),
    }
}

fn names(entities: Option<Vec<MalEntity>>) -> Vec<String> {
    entities
        .unwrap_or_default()
        .into_iter()
        .map(|e| e.name)
        .filter(|n| !n.trim().is_empty())
        .collect()
}

fn cover_url(images: Option<AnimeImages>) -> Option<String> {
    let jpg = images?.jpg?;
    non_empty(jpg.large_image_url).or(non_empty(jpg.image_url))
}

fn trailer(info: Option<TrailerInfo>) -> Option<Trailer> {
    let info = info?;
    let id = non_empty(info.youtube_id)?;
    let url = non_empty(info.url).unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", id));
    Some(Trailer {
        site: "youtube".to_string(),
        id,
        url: Some(url),
    })
}

/// Map one top-list entry
pub fn normalize_top_entry(entry: TopAnimeEntry) -> Result<MediaRecord, NormalizeError> {
    let titles = TitleVariants {
        english: non_empty(entry.title_english),
        romanized: non_empty(entry.title),
        native: non_empty(entry.title_japanese),
    };
    let title = titles.display().ok_or_else(|| NormalizeError::MissingField {
        provider: PROVIDER,
        id: entry.mal_id.to_string(),
        field: "title",
    })?;

    let mut genres = names(entry.genres);
    genres.extend(names(entry.themes));

    Ok(MediaRecord {
        id: RecordId::Numeric(entry.mal_id),
        kind: MediaKind::Anime,
        title,
        titles,
        format: entry.anime_type,
        status: entry.status,
        year: entry.year,
        episodes: entry.episodes,
        chapters: None,
        duration_minutes: entry.duration.as_deref().and_then(parse_duration_minutes),
        score: entry.score,
        popularity: entry.members,
        genres,
        studios: names(entry.studios),
        authors: Vec::new(),
        artists: Vec::new(),
        synopsis: entry
            .synopsis
            .map(|s| clean_text(&s))
            .filter(|s| !s.is_empty()),
        cover_image: cover_url(entry.images),
        banner_image: None,
        trailer: trailer(entry.trailer),
        relations: None,
    })
}

/// Map a list of top entries, skipping the ones without a usable title
pub fn normalize_top(entries: Vec<TopAnimeEntry>) -> Vec<MediaRecord> {
    entries
        .into_iter()
        .filter_map(|entry| match normalize_top_entry(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping unusable catalog entry");
                None
            }
        })
        .collect()
}

fn parse_aired(aired: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(aired?)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Map an episode window.
///
/// Episode numbers come from the window position, not the upstream
/// ordinal: `(page - 1) * page_size + index + 1`.
pub fn normalize_episodes(entries: Vec<EpisodeEntry>, page: u32, page_size: u32) -> Vec<EpisodeRecord> {
    let base = page.saturating_sub(1).saturating_mul(page_size);

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let number = base + index as u32 + 1;
            EpisodeRecord {
                id: entry.mal_id,
                number,
                title: non_empty(entry.title).unwrap_or_else(|| format!("Episode {}", number)),
                title_romanized: non_empty(entry.title_romanji),
                title_native: non_empty(entry.title_japanese),
                aired: parse_aired(entry.aired.as_deref()),
                score: entry.score,
                filler: entry.filler,
                recap: entry.recap,
            }
        })
        .collect()
}
