//! Numbering series routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gestra_core::series::{DocumentSeries, SeriesKind};
use gestra_shared::types::SeriesId;

use crate::AppState;

use super::error_response;

/// Creates the series routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/series", post(create_series))
        .route("/series", get(list_series))
        .route("/series/{id}", get(get_series))
}

/// Request body for registering a series.
#[derive(Debug, Deserialize)]
pub struct CreateSeriesRequest {
    /// Human name (e.g. "Série Geral 2025").
    pub name: String,
    /// Short code stamped into numbers.
    pub code: String,
    /// Numbering mode.
    pub kind: SeriesKind,
    /// The fiscal year the series applies to.
    pub fiscal_year: i32,
}

/// POST `/series` - Register a numbering series.
async fn create_series(
    State(state): State<AppState>,
    Json(payload): Json<CreateSeriesRequest>,
) -> impl IntoResponse {
    let series = state.engine.store().insert_series(DocumentSeries::new(
        payload.name,
        payload.code,
        payload.kind,
        payload.fiscal_year,
    ));
    (StatusCode::CREATED, Json(json!({ "series": series }))).into_response()
}

/// GET `/series` - List all series.
async fn list_series(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.store().list_series() {
        Ok(series) => Json(json!({ "series": series })).into_response(),
        Err(error) => error_response(&error),
    }
}

/// GET `/series/{id}` - Fetch one series with its counters.
async fn get_series(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.engine.store().series(SeriesId::from_uuid(id)) {
        Ok(series) => Json(json!({ "series": series })).into_response(),
        Err(error) => error_response(&error),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{create_router, AppState};

    #[tokio::test]
    async fn test_create_and_fetch_series() {
        let state = AppState::new();
        let app = create_router(state.clone());

        let body = serde_json::json!({
            "name": "Série Geral 2025",
            "code": "A",
            "kind": "normal",
            "fiscal_year": 2025
        })
        .to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/series")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let id = value["series"]["id"].as_str().unwrap();

        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/series/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_series_is_404() {
        let app = create_router(AppState::new());
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/series/{}", uuid::Uuid::now_v7()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
