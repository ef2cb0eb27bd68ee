use std::sync::Arc;

use axum::{http::StatusCode, middleware, routing::get, routing::post, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{
    db::TitleStore,
    middleware::{make_span_with_request_id, request_id_middleware},
};

pub mod recommendations;
pub mod statistics;
pub mod titles;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TitleStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TitleStore>) -> Self {
        Self { store }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles/", get(titles::list))
        .route("/titles/create/", post(titles::create))
        .route("/titles/search/", get(titles::search))
        .route("/statistics/", get(statistics::statistics))
        .route("/country/:name/", get(statistics::by_country))
        .route("/recommendations/", get(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::middleware::REQUEST_ID_HEADER;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_supplied_request_id_is_echoed() {
        let id = "5f0e3c1a-8d7b-4c2e-9a61-3b2f1d0c9e87";
        let request = Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, id)
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], id);
    }

    #[tokio::test]
    async fn test_invalid_request_id_is_replaced() {
        let request = Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let echoed = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(echoed).is_ok());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let request = Request::builder()
            .uri("/api/unknown/")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
