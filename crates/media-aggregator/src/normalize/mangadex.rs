//! Manga catalog entries → unified records.

use super::{clean_text, non_empty};
use crate::api::mangadex::{LocalizedString, MangaAttributes, MangaData, Relationship, PROVIDER};
use crate::error::NormalizeError;
use shared::{MediaKind, MediaRecord, RecordId, TitleVariants};
use tracing::warn;

/// Look a language up in the title map first, then in the alternative titles
fn title_in(attributes: &MangaAttributes, lang: &str) -> Option<String> {
    let primary = attributes.title.get(lang).cloned();
    non_empty(primary).or_else(|| {
        attributes
            .alt_title_pairs()
            .find(|(l, t)| *l == lang && !t.trim().is_empty())
            .map(|(_, t)| t.trim().to_string())
    })
}

/// First non-blank value in language-code order
fn first_by_language(map: &LocalizedString) -> Option<&String> {
    let mut langs: Vec<_> = map.keys().collect();
    langs.sort();
    langs
        .into_iter()
        .filter_map(|lang| map.get(lang))
        .find(|value| !value.trim().is_empty())
}

fn title_variants(attributes: &MangaAttributes) -> TitleVariants {
    let original = attributes
        .original_language
        .as_deref()
        .filter(|l| !l.is_empty() && *l != "en")
        .unwrap_or("ja");

    TitleVariants {
        english: title_in(attributes, "en"),
        romanized: title_in(attributes, &format!("{}-ro", original)),
        native: title_in(attributes, original),
    }
}

fn format_for(original_language: Option<&str>) -> Option<String> {
    let format = match original_language? {
        "ja" => "MANGA",
        "ko" => "MANHWA",
        "zh" | "zh-hk" => "MANHUA",
        _ => return None,
    };
    Some(format.to_string())
}

fn related_names(relationships: &[Relationship], kind: &str) -> Vec<String> {
    relationships
        .iter()
        .filter(|r| r.kind == kind)
        .filter_map(|r| non_empty(r.attributes.as_ref()?.name.clone()))
        .collect()
}

fn cover_url(data: &MangaData, cover_base_url: &str) -> Option<String> {
    let file_name = data
        .relationships
        .iter()
        .find(|r| r.kind == "cover_art")
        .and_then(|r| non_empty(r.attributes.as_ref()?.file_name.clone()))?;

    Some(format!(
        "{}/{}/{}",
        cover_base_url.trim_end_matches('/'),
        data.id,
        file_name
    ))
}

/// Chapter count from `lastChapter` ("1110", "52.5"); non-numeric values are ignored
fn chapter_count(last_chapter: Option<&str>) -> Option<u32> {
    let chapter: f64 = last_chapter?.trim().parse().ok()?;
    (chapter.is_finite() && chapter >= 1.0).then(|| chapter.floor() as u32)
}

/// Map one manga entity
pub fn normalize_manga(data: MangaData, cover_base_url: &str) -> Result<MediaRecord, NormalizeError> {
    let attributes = &data.attributes;
    let titles = title_variants(attributes);

    // Some entries carry their only title under an unrelated language code
    let title = titles
        .display()
        .or_else(|| non_empty(first_by_language(&attributes.title).cloned()))
        .ok_or_else(|| NormalizeError::MissingField {
            provider: PROVIDER,
            id: data.id.clone(),
            field: "title",
        })?;

    let genres = attributes
        .tags
        .iter()
        .filter(|t| t.attributes.group.as_deref() == Some("genre"))
        .filter_map(|t| non_empty(t.attributes.name.get("en").cloned()))
        .collect();

    let synopsis = attributes
        .description
        .get("en")
        .or_else(|| first_by_language(&attributes.description))
        .map(|d| clean_text(d))
        .filter(|d| !d.is_empty());

    Ok(MediaRecord {
        id: RecordId::Text(data.id.clone()),
        kind: MediaKind::Manga,
        title,
        titles,
        format: format_for(attributes.original_language.as_deref()),
        status: attributes.status.clone(),
        year: attributes.year,
        episodes: None,
        chapters: chapter_count(attributes.last_chapter.as_deref()),
        duration_minutes: None,
        score: None,
        popularity: None,
        genres,
        studios: Vec::new(),
        authors: related_names(&data.relationships, "author"),
        artists: related_names(&data.relationships, "artist"),
        synopsis,
        cover_image: cover_url(&data, cover_base_url),
        banner_image: None,
        trailer: None,
        relations: None,
    })
}

/// Map a search window, skipping entries that cannot be normalized
pub fn normalize_collection(items: Vec<MangaData>, cover_base_url: &str) -> Vec<MediaRecord> {
    items
        .into_iter()
        .filter_map(|data| match normalize_manga(data, cover_base_url) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping unusable manga entry");
                None
            }
        })
        .collect()
}
