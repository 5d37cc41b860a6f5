//! Cash register routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gestra_core::ledger::types::CashRegister;
use gestra_shared::types::CashRegisterId;
use gestra_shared::types::money::Currency;

use crate::AppState;

use super::error_response;

/// Creates the cash register routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cash-registers", post(create_register))
        .route("/cash-registers/{id}", get(get_register))
}

/// Request body for opening a cash register.
#[derive(Debug, Deserialize)]
pub struct CreateRegisterRequest {
    /// Register name.
    pub name: String,
    /// Opening balance.
    #[serde(default)]
    pub initial_balance: Decimal,
    /// Register currency; defaults to the system currency.
    #[serde(default)]
    pub currency: Option<Currency>,
}

/// POST `/cash-registers` - Open a cash register.
async fn create_register(
    State(state): State<AppState>,
    Json(payload): Json<CreateRegisterRequest>,
) -> impl IntoResponse {
    let register = state.engine.store().insert_register(CashRegister::new(
        payload.name,
        payload.initial_balance,
        payload.currency.unwrap_or_else(Currency::default_currency),
    ));
    (StatusCode::CREATED, Json(json!({ "register": register }))).into_response()
}

/// GET `/cash-registers/{id}` - Fetch a register's balance.
async fn get_register(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state
        .engine
        .store()
        .register(CashRegisterId::from_uuid(id))
    {
        Ok(register) => Json(json!({ "register": register })).into_response(),
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
    async fn test_open_register_defaults() {
        let app = create_router(AppState::new());
        let body = serde_json::json!({ "name": "Caixa 1" }).to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/cash-registers")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["register"]["status"], "open");
        assert_eq!(value["register"]["currency"], "AOA");
        assert_eq!(value["register"]["balance"], "0");
    }
}
