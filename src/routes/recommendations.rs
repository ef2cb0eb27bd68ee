use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Utc};

use crate::{
    error::AppResult,
    models::{RecommendationParams, RecommendationResponse},
    services::recommendations,
};

use super::AppState;

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<RecommendationResponse>> {
    let current_year = Utc::now().year();
    let response =
        recommendations::get_recommendations(state.store.as_ref(), &params, current_year).await?;
    Ok(Json(response))
}
