//! Stock movement log routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use gestra_shared::types::pagination::{PageRequest, PageResponse};

use crate::AppState;

use super::error_response;

/// Creates the stock movement routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/stock-movements", get(list_movements))
}

/// GET `/stock-movements` - Page through the append-only movement log.
async fn list_movements(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .store()
        .movements_page(page.offset(), page.limit())
    {
        Ok((movements, total)) => Json(json!(PageResponse::new(
            movements,
            page.page,
            page.per_page,
            total as u64,
        )))
        .into_response(),
        Err(error) => error_response(&error),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{create_router, AppState};

    #[tokio::test]
    async fn test_empty_log_pages_cleanly() {
        let app = create_router(AppState::new());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/stock-movements?page=1&per_page=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["meta"]["total"], 0);
        assert_eq!(value["data"].as_array().unwrap().len(), 0);
    }
}
