use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{CreateTitleRequest, ListParams, SearchParams, SearchResponse, Title},
    services::{catalog, title_search},
};

use super::AppState;

/// Handler for the title listing
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Title>>> {
    let titles = title_search::list_titles(state.store.as_ref(), &params).await?;
    Ok(Json(titles))
}

/// Handler for title creation
///
/// Malformed JSON bodies are reported as `{"error": ...}` rather than with
/// axum's plain-text rejection.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CreateTitleRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Title>)> {
    let Json(request) = payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    tracing::info!(request_id = %request_id, show_id = ?request.show_id, "Creating title");

    let title = catalog::create_title(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

/// Handler for the advanced search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let response = title_search::search_titles(state.store.as_ref(), &params).await?;

    tracing::info!(request_id = %request_id, count = response.count, "Search completed");

    Ok(Json(response))
}
