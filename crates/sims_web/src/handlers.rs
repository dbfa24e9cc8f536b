use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use sims_core::{ArticleId, DashboardData, DateRange, ListTransformer};
use tracing::debug;

use crate::error::ApiError;
use crate::query::{KeywordsQuery, NewsQuery, RangeQuery};
use crate::AppState;

type ApiResult = std::result::Result<Response, ApiError>;

async fn load(state: &AppState, range: &DateRange) -> std::result::Result<DashboardData, ApiError> {
    state.source.dashboard(range).await.map_err(ApiError::dashboard)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> ApiResult {
    let view = query.view().map_err(ApiError::dashboard)?;
    let range = query.range().map_err(ApiError::dashboard)?;
    let data = load(&state, &range).await?;

    let page = ListTransformer::new(&data.latest_indian_news, &state.stopwords).page(&view);
    debug!(
        "News page {}/{} ({} matching)",
        page.current_page, page.total_pages, page.total
    );
    Ok(Json(page).into_response())
}

pub async fn keywords(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeywordsQuery>,
) -> ApiResult {
    let limit = query.limit(state.keyword_limit).map_err(ApiError::dashboard)?;
    let range = query.range().map_err(ApiError::dashboard)?;
    let data = load(&state, &range).await?;

    let keywords = ListTransformer::new(&data.latest_indian_news, &state.stopwords).top_keywords(limit);
    Ok(Json(keywords).into_response())
}

pub async fn categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult {
    let range = query.range().map_err(ApiError::dashboard)?;
    let data = load(&state, &range).await?;
    Ok(Json(ListTransformer::new(&data.latest_indian_news, &state.stopwords).categories()).into_response())
}

pub async fn tone(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult {
    let range = query.range().map_err(ApiError::dashboard)?;
    let data = load(&state, &range).await?;
    Ok(Json(ListTransformer::new(&data.latest_indian_news, &state.stopwords).tone()).into_response())
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let detail = state
        .source
        .article(&ArticleId(id))
        .await
        .map_err(ApiError::article)?;
    Ok(Json(detail.view()).into_response())
}
