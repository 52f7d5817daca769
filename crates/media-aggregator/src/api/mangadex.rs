//! Manga catalog provider (MangaDex schema).
//!
//! Collections are addressed by `offset`/`limit`; localized strings are maps
//! keyed by language code.

use super::http::HttpTransport;
use super::MangaProvider;
use crate::error::UpstreamError;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shared::config::MangaConfig;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

pub const PROVIDER: &str = "mangadex";

/// Language code → text
pub type LocalizedString = HashMap<String, String>;

/// Accept a language map, or anything else (the provider sends `[]` for
/// empty maps) as an empty map.
fn localized<'de, D>(deserializer: D) -> Result<LocalizedString, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(lang, text)| match text {
                Value::String(s) => Some((lang, s)),
                _ => None,
            })
            .collect(),
        _ => LocalizedString::new(),
    })
}

/// `/manga` collection response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaCollection {
    #[serde(default)]
    pub data: Vec<MangaData>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u64,
}

impl MangaCollection {
    /// Whether items exist beyond this window
    pub fn has_more(&self) -> bool {
        (self.offset as u64 + self.data.len() as u64) < self.total
    }
}

/// `/manga/{id}` entity response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaEntity {
    pub data: MangaData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaData {
    pub id: String,
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaAttributes {
    #[serde(default, deserialize_with = "localized")]
    pub title: LocalizedString,
    #[serde(default)]
    pub alt_titles: Vec<Value>,
    #[serde(default, deserialize_with = "localized")]
    pub description: LocalizedString,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub last_chapter: Option<String>,
    #[serde(default)]
    pub publication_demographic: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl MangaAttributes {
    /// Alternative titles flattened into `(language, title)` pairs
    pub fn alt_title_pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.alt_titles
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|map| map.iter())
            .filter_map(|(lang, title)| title.as_str().map(|t| (lang.as_str(), t)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub attributes: TagAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagAttributes {
    #[serde(default, deserialize_with = "localized")]
    pub name: LocalizedString,
    #[serde(default)]
    pub group: Option<String>,
}

/// Related entity (author, artist, cover art, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<RelationshipAttributes>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// MangaDex REST client
pub struct MangaDexClient {
    transport: HttpTransport,
    base_url: String,
}

static INCLUDES: [&str; 3] = ["author", "artist", "cover_art"];

impl MangaDexClient {
    /// Create a new client
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(PROVIDER, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `[manga]` config section
    pub fn from_config(config: &MangaConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn includes() -> impl Iterator<Item = (&'static str, String)> {
        INCLUDES.iter().map(|i| ("includes[]", i.to_string()))
    }
}

#[async_trait]
impl MangaProvider for MangaDexClient {
    async fn search(
        &self,
        title: &str,
        offset: usize,
        limit: usize,
    ) -> Result<MangaCollection, UpstreamError> {
        info!(title = %title, offset = offset, limit = limit, "Searching manga catalog");

        let mut query = vec![
            ("title", title.to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
            ("order[relevance]", "desc".to_string()),
        ];
        query.extend(Self::includes());

        self.transport
            .get_json(&format!("{}/manga", self.base_url), &query)
            .await
    }

    async fn manga(&self, id: &Uuid) -> Result<Option<MangaData>, UpstreamError> {
        debug!(id = %id, "Fetching manga");

        let query: Vec<_> = Self::includes().collect();
        match self
            .transport
            .get_json::<MangaEntity>(&format!("{}/manga/{}", self.base_url, id), &query)
            .await
        {
            Ok(entity) => Ok(Some(entity.data)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_description_array_decodes() {
        let data: MangaData = serde_json::from_value(json!({
            "id": "a1c7c817-4e59-43b7-9365-09675a149a6f",
            "type": "manga",
            "attributes": {
                "title": { "en": "One Piece" },
                "altTitles": [{ "ja": "ワンピース" }, { "ja-ro": "Wan Pīsu" }],
                "description": [],
                "tags": []
            }
        }))
        .unwrap();

        assert!(data.attributes.description.is_empty());
        assert!(data.relationships.is_empty());
        let pairs: Vec<_> = data.attributes.alt_title_pairs().collect();
        assert_eq!(pairs, vec![("ja", "ワンピース"), ("ja-ro", "Wan Pīsu")]);
    }

    #[test]
    fn test_collection_has_more() {
        let collection = MangaCollection {
            data: Vec::new(),
            limit: 10,
            offset: 0,
            total: 5,
        };
        assert!(!collection.has_more());

        let collection: MangaCollection = serde_json::from_value(json!({
            "data": [{ "id": "x", "attributes": {} }],
            "limit": 1, "offset": 3, "total": 10
        }))
        .unwrap();
        assert!(collection.has_more());
    }

    #[test]
    fn test_client_from_config() {
        assert!(MangaDexClient::from_config(&MangaConfig::default()).is_ok());
    }
}
