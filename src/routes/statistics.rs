use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{CountryResponse, Statistics},
    services::catalog,
};

use super::AppState;

/// Handler for catalog-wide statistics
pub async fn statistics(State(state): State<Arc<AppState>>) -> AppResult<Json<Statistics>> {
    let stats = catalog::get_statistics(state.store.as_ref()).await?;
    Ok(Json(stats))
}

/// Handler for the per-country lookup
pub async fn by_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<Json<CountryResponse>> {
    let response = catalog::titles_by_country(state.store.as_ref(), &name).await?;
    Ok(Json(response))
}
