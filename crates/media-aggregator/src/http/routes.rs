use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use shared::{EpisodePage, MediaPage, MediaRecord, NewsDigest};

use super::error::{ApiError, Result};
use super::params::ListQuery;
use super::AppState;
use crate::service::{EPISODE_LIMITS, MANGA_LIMITS, SEARCH_LIMITS, TOP_LIMITS};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/metadata/search", get(search_metadata))
        .route("/metadata/:id", get(get_metadata))
        .route("/catalog/top", get(top_catalog))
        .route("/catalog/:id/episodes", get(list_episodes))
        .route("/feeds", get(get_feeds))
        .route("/manga/search", get(search_manga))
        .route("/manga/:id", get(get_manga))
}

fn numeric_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid id: {}", raw)))
}

async fn search_metadata(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<MediaPage>> {
    let page = state
        .service
        .search_anime(params.query(), params.page(), params.limit(20, &SEARCH_LIMITS))
        .await?;
    Ok(Json(page))
}

async fn get_metadata(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MediaRecord>> {
    let record = state.service.anime_details(numeric_id(&id)?).await?;
    Ok(Json(record))
}

async fn top_catalog(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<MediaPage>> {
    let page = state
        .service
        .top_anime(params.page(), params.limit(25, &TOP_LIMITS))
        .await?;
    Ok(Json(page))
}

async fn list_episodes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListQuery>,
) -> Result<Json<EpisodePage>> {
    let episodes = state
        .service
        .episodes(
            numeric_id(&id)?,
            params.page(),
            params.limit(100, &EPISODE_LIMITS),
        )
        .await?;
    Ok(Json(episodes))
}

async fn get_feeds(State(state): State<AppState>) -> Result<Json<NewsDigest>> {
    let digest = state.service.news().await?;
    Ok(Json(digest))
}

async fn search_manga(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<MediaPage>> {
    let page = state
        .service
        .search_manga(params.query(), params.page(), params.limit(20, &MANGA_LIMITS))
        .await?;
    Ok(Json(page))
}

async fn get_manga(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MediaRecord>> {
    let record = state.service.manga_details(&id).await?;
    Ok(Json(record))
}
