//! GraphQL metadata provider (AniList schema).
//!
//! All caller input travels in the `variables` object of the request; the
//! query documents below are constants.

use super::http::HttpTransport;
use super::MetadataProvider;
use crate::error::{UpstreamError, UpstreamStatus};
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const PROVIDER: &str = "anilist";

const MEDIA_FIELDS: &str = r#"
    id
    idMal
    type
    title { romaji english native }
    format
    status
    episodes
    chapters
    duration
    averageScore
    popularity
    genres
    seasonYear
    description(asHtml: false)
    coverImage { extraLarge large }
    bannerImage
    trailer { id site }
    studios(isMain: true) { nodes { name } }
"#;

fn search_query() -> String {
    format!(
        r#"query ($search: String, $page: Int, $perPage: Int) {{
  Page(page: $page, perPage: $perPage) {{
    pageInfo {{ total currentPage hasNextPage perPage }}
    media(search: $search, type: ANIME, sort: SEARCH_MATCH) {{ {fields} }}
  }}
}}"#,
        fields = MEDIA_FIELDS
    )
}

fn details_query() -> String {
    format!(
        r#"query ($id: Int) {{
  Media(id: $id, type: ANIME) {{
    {fields}
    relations {{
      edges {{
        relationType
        node {{ id type format title {{ romaji english native }} coverImage {{ large }} }}
      }}
    }}
  }}
}}"#,
        fields = MEDIA_FIELDS
    )
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    #[serde(rename = "Page")]
    pub page: Option<MediaPageData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPageData {
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    #[serde(default)]
    pub media: Option<Vec<AniListMedia>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: Option<u64>,
    pub current_page: Option<u32>,
    pub has_next_page: Option<bool>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaData {
    #[serde(rename = "Media")]
    pub media: Option<AniListMedia>,
}

/// Media object as returned by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniListMedia {
    pub id: u64,
    #[serde(default)]
    pub id_mal: Option<u64>,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<MediaTitle>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub chapters: Option<u32>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub average_score: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u64>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub season_year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub trailer: Option<AniListTrailer>,
    #[serde(default)]
    pub studios: Option<StudioConnection>,
    #[serde(default)]
    pub relations: Option<RelationConnection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub extra_large: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniListTrailer {
    pub id: Option<String>,
    pub site: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConnection {
    #[serde(default)]
    pub nodes: Option<Vec<Option<NamedNode>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedNode {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationConnection {
    #[serde(default)]
    pub edges: Option<Vec<Option<RelationEdge>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEdge {
    pub relation_type: Option<String>,
    pub node: Option<RelationNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationNode {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub title: Option<MediaTitle>,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
}

/// One page of search results
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub media: Vec<AniListMedia>,
    pub total: u64,
    pub has_next_page: bool,
}

/// AniList GraphQL client
pub struct AniListClient {
    transport: HttpTransport,
    endpoint: String,
}

impl AniListClient {
    /// Create a new client
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(PROVIDER, timeout)?,
            endpoint,
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, UpstreamError> {
        let body = json!({ "query": query, "variables": variables });
        let response: GraphQlResponse<T> = self.transport.post_json(&self.endpoint, &body).await?;
        unwrap_graphql(response)
    }
}

/// Turn a GraphQL envelope into data or a typed failure
fn unwrap_graphql<T>(response: GraphQlResponse<T>) -> Result<T, UpstreamError> {
    if let Some(error) = response.errors.first() {
        warn!(
            provider = PROVIDER,
            error = %error.message,
            status = ?error.status,
            "GraphQL query returned errors"
        );
        let status = match error.status {
            Some(code) if code >= 400 => UpstreamStatus::Http(code),
            _ => UpstreamStatus::Malformed,
        };
        return Err(UpstreamError::new(PROVIDER, status, error.message.clone()));
    }

    response
        .data
        .ok_or_else(|| UpstreamError::malformed(PROVIDER, "GraphQL response without data"))
}

#[async_trait]
impl MetadataProvider for AniListClient {
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage, UpstreamError> {
        info!(query = %query, page = page, per_page = per_page, "Searching anime metadata");

        let data: PageData = self
            .query(
                &search_query(),
                json!({ "search": query, "page": page, "perPage": per_page }),
            )
            .await?;

        let page_data = data
            .page
            .ok_or_else(|| UpstreamError::malformed(PROVIDER, "Missing Page in response"))?;
        let media = page_data.media.unwrap_or_default();
        let info = page_data.page_info;

        Ok(SearchPage {
            total: info
                .as_ref()
                .and_then(|i| i.total)
                .unwrap_or(media.len() as u64),
            has_next_page: info.and_then(|i| i.has_next_page).unwrap_or(false),
            media,
        })
    }

    async fn media(&self, id: u64) -> Result<Option<AniListMedia>, UpstreamError> {
        debug!(id = id, "Fetching anime metadata");

        match self
            .query::<MediaData>(&details_query(), json!({ "id": id }))
            .await
        {
            Ok(data) => Ok(data.media),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AniListClient::new(
            "https://graphql.anilist.co".to_string(),
            Duration::from_secs(12),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_queries_take_variables_only() {
        let search = search_query();
        assert!(search.contains("$search: String"));
        assert!(search.contains("media(search: $search"));
        assert!(details_query().contains("Media(id: $id"));
    }

    #[test]
    fn test_not_found_error_maps_to_404() {
        let response: GraphQlResponse<MediaData> = serde_json::from_value(json!({
            "errors": [{ "message": "Not Found.", "status": 404 }],
            "data": { "Media": null }
        }))
        .unwrap();

        let err = unwrap_graphql(response).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_error_is_malformed() {
        let response: GraphQlResponse<MediaData> = serde_json::from_value(json!({
            "errors": [{ "message": "Variable $id got invalid value" }],
            "data": null
        }))
        .unwrap();

        let err = unwrap_graphql(response).unwrap_err();
        assert_eq!(err.status, UpstreamStatus::Malformed);
    }

    #[test]
    fn test_media_decodes_with_nulls() {
        let data: MediaData = serde_json::from_value(json!({
            "Media": {
                "id": 16498,
                "title": { "romaji": "Shingeki no Kyojin", "english": null, "native": "進撃の巨人" },
                "genres": null,
                "studios": { "nodes": [null, { "name": "Wit Studio" }] },
                "relations": null
            }
        }))
        .unwrap();

        let media = data.media.unwrap();
        assert_eq!(media.id, 16498);
        assert!(media.genres.is_none());
        assert_eq!(media.studios.unwrap().nodes.unwrap().len(), 2);
    }
}
