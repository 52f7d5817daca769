//! GraphQL metadata → unified records.

use super::{clean_text, non_empty};
use crate::api::anilist::{
    AniListMedia, AniListTrailer, CoverImage, MediaTitle, RelationNode, SearchPage, PROVIDER,
};
use crate::error::NormalizeError;
use shared::{MediaKind, MediaPage, MediaRecord, RecordId, RelatedMedia, TitleVariants, Trailer};
use tracing::warn;

fn title_variants(title: Option<MediaTitle>) -> TitleVariants {
    let title = title.unwrap_or_default();
    TitleVariants {
        english: non_empty(title.english),
        romanized: non_empty(title.romaji),
        native: non_empty(title.native),
    }
}

fn media_kind(media_type: Option<&str>) -> MediaKind {
    match media_type {
        Some(t) if t.eq_ignore_ascii_case("manga") => MediaKind::Manga,
        _ => MediaKind::Anime,
    }
}

fn cover_url(cover: Option<CoverImage>) -> Option<String> {
    cover.and_then(|c| non_empty(c.extra_large).or(non_empty(c.large)))
}

fn trailer(trailer: Option<AniListTrailer>) -> Option<Trailer> {
    let trailer = trailer?;
    let id = non_empty(trailer.id)?;
    let site = non_empty(trailer.site)?.to_lowercase();
    let url = match site.as_str() {
        "youtube" => Some(format!("https://www.youtube.com/watch?v={}", id)),
        "dailymotion" => Some(format!("https://www.dailymotion.com/video/{}", id)),
        _ => None,
    };
    Some(Trailer { site, id, url })
}

fn related(relation: Option<String>, node: RelationNode) -> Option<RelatedMedia> {
    let title = title_variants(node.title).display()?;
    Some(RelatedMedia {
        id: RecordId::Numeric(node.id),
        relation: relation.unwrap_or_else(|| "OTHER".to_string()),
        title,
        kind: Some(media_kind(node.media_type.as_deref())),
        format: node.format,
        cover_image: cover_url(node.cover_image),
    })
}

/// Map one media object, leaving relations out
pub fn normalize_media(media: AniListMedia) -> Result<MediaRecord, NormalizeError> {
    let titles = title_variants(media.title);
    let title = titles.display().ok_or_else(|| NormalizeError::MissingField {
        provider: PROVIDER,
        id: media.id.to_string(),
        field: "title",
    })?;

    let studios = media
        .studios
        .and_then(|s| s.nodes)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|node| non_empty(node.name))
        .collect();

    Ok(MediaRecord {
        id: RecordId::Numeric(media.id),
        kind: media_kind(media.media_type.as_deref()),
        title,
        titles,
        format: media.format,
        status: media.status,
        year: media.season_year,
        episodes: media.episodes,
        chapters: media.chapters,
        duration_minutes: media.duration,
        // 0-100 upstream, 0-10 in the unified shape
        score: media.average_score.map(|s| f64::from(s) / 10.0),
        popularity: media.popularity,
        genres: media.genres.unwrap_or_default(),
        studios,
        authors: Vec::new(),
        artists: Vec::new(),
        synopsis: media
            .description
            .map(|d| clean_text(&d))
            .filter(|d| !d.is_empty()),
        cover_image: cover_url(media.cover_image),
        banner_image: non_empty(media.banner_image),
        trailer: trailer(media.trailer),
        relations: None,
    })
}

/// Map a detail lookup, including its related media
pub fn normalize_details(mut media: AniListMedia) -> Result<MediaRecord, NormalizeError> {
    let relations: Vec<RelatedMedia> = media
        .relations
        .take()
        .and_then(|r| r.edges)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|edge| related(edge.relation_type, edge.node?))
        .collect();

    let mut record = normalize_media(media)?;
    record.relations = Some(relations);
    Ok(record)
}

/// Map a search page; records that cannot be normalized are skipped
pub fn normalize_search(page: SearchPage) -> MediaPage {
    let items = page
        .media
        .into_iter()
        .filter_map(|media| match normalize_media(media) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping unusable search result");
                None
            }
        })
        .collect();

    MediaPage {
        items,
        total: page.total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn media(value: serde_json::Value) -> AniListMedia {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_title_preference_skips_empty_english() {
        let record = normalize_media(media(json!({
            "id": 16498,
            "title": { "english": "", "romaji": "Shingeki", "native": "進撃" }
        })))
        .unwrap();

        assert_eq!(record.title, "Shingeki");
        assert_eq!(record.titles.native.as_deref(), Some("進撃"));
        assert_eq!(record.titles.english, None);
    }

    #[test]
    fn test_missing_collections_become_empty_arrays() {
        let record = normalize_media(media(json!({
            "id": 1,
            "title": { "romaji": "Cowboy Bebop" },
            "genres": null,
            "studios": null
        })))
        .unwrap();

        assert!(record.genres.is_empty());
        assert!(record.studios.is_empty());
        assert!(record.authors.is_empty());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["genres"], json!([]));
        assert_eq!(json["studios"], json!([]));
        assert!(json.get("relations").is_none());
    }

    #[test]
    fn test_full_media_mapping() {
        let record = normalize_media(media(json!({
            "id": 16498,
            "idMal": 16498,
            "type": "ANIME",
            "title": { "english": "Attack on Titan", "romaji": "Shingeki no Kyojin", "native": "進撃の巨人" },
            "format": "TV",
            "status": "FINISHED",
            "episodes": 25,
            "duration": 24,
            "averageScore": 85,
            "popularity": 900000,
            "genres": ["Action", "Drama"],
            "seasonYear": 2013,
            "description": "Several hundred years ago, humans were nearly <i>exterminated</i> by titans.<br>",
            "coverImage": { "extraLarge": null, "large": "https://img/large.jpg" },
            "bannerImage": "https://img/banner.jpg",
            "trailer": { "id": "LHtdKWJdif4", "site": "youtube" },
            "studios": { "nodes": [{ "name": "Wit Studio" }] }
        })))
        .unwrap();

        assert_eq!(record.id, RecordId::Numeric(16498));
        assert_eq!(record.kind, MediaKind::Anime);
        assert_eq!(record.title, "Attack on Titan");
        assert_eq!(record.score, Some(8.5));
        assert_eq!(record.episodes, Some(25));
        assert_eq!(record.studios, vec!["Wit Studio"]);
        assert_eq!(record.cover_image.as_deref(), Some("https://img/large.jpg"));
        assert_eq!(
            record.synopsis.as_deref(),
            Some("Several hundred years ago, humans were nearly exterminated by titans.")
        );
        let trailer = record.trailer.unwrap();
        assert_eq!(trailer.site, "youtube");
        assert_eq!(
            trailer.url.as_deref(),
            Some("https://www.youtube.com/watch?v=LHtdKWJdif4")
        );
    }

    #[test]
    fn test_media_without_titles_is_missing_field() {
        let err = normalize_media(media(json!({ "id": 5, "title": { "english": " " } }))).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingField {
                provider: PROVIDER,
                id: "5".to_string(),
                field: "title",
            }
        );
    }

    #[test]
    fn test_details_include_relations() {
        let record = normalize_details(media(json!({
            "id": 16498,
            "title": { "romaji": "Shingeki no Kyojin" },
            "relations": { "edges": [
                { "relationType": "SEQUEL", "node": {
                    "id": 20958, "type": "ANIME", "format": "TV",
                    "title": { "romaji": "Shingeki no Kyojin Season 2" },
                    "coverImage": { "large": "https://img/s2.jpg" }
                } },
                { "relationType": "ADAPTATION", "node": {
                    "id": 53390, "type": "MANGA",
                    "title": { "english": "Attack on Titan", "native": "進撃の巨人" }
                } },
                null,
                { "relationType": "OTHER", "node": null }
            ] }
        })))
        .unwrap();

        let relations = record.relations.unwrap();
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0].relation, "SEQUEL");
        assert_eq!(relations[0].cover_image.as_deref(), Some("https://img/s2.jpg"));
        assert_eq!(relations[1].kind, Some(MediaKind::Manga));
        assert_eq!(relations[1].title, "Attack on Titan");
    }

    #[test]
    fn test_search_skips_unusable_records() {
        let page = SearchPage {
            media: vec![
                media(json!({ "id": 1, "title": { "romaji": "Naruto" } })),
                media(json!({ "id": 2 })),
            ],
            total: 112,
            has_next_page: true,
        };

        let normalized = normalize_search(page);
        assert_eq!(normalized.items.len(), 1);
        assert_eq!(normalized.total, 112);
    }
}
