//! API route definitions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;

use gestra_core::FiscalError;

use crate::AppState;

pub mod documents;
pub mod health;
pub mod parties;
pub mod products;
pub mod registers;
pub mod series;
pub mod stock;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(documents::routes())
        .merge(series::routes())
        .merge(parties::routes())
        .merge(registers::routes())
        .merge(products::routes())
        .merge(stock::routes())
}

/// Maps an engine error to the JSON error envelope.
pub(crate) fn error_response(error: &FiscalError) -> Response {
    let status = StatusCode::from_u16(error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": {
                "code": error.error_code(),
                "message": error.to_string(),
            }
        })),
    )
        .into_response()
}
