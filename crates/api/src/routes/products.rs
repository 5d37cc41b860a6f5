//! Inventory product routes.

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

use gestra_core::ledger::types::Product;
use gestra_shared::types::{ProductId, WarehouseId};

use crate::AppState;

use super::error_response;

/// Creates the product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/{id}", get(get_product))
}

/// Request body for registering a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Product name.
    pub name: String,
    /// Opening stock level.
    #[serde(default)]
    pub stock: Decimal,
    /// Default warehouse; a fresh one is assigned when omitted.
    #[serde(default)]
    pub warehouse_id: Option<Uuid>,
}

/// POST `/products` - Register an inventory product.
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> impl IntoResponse {
    let warehouse_id = payload
        .warehouse_id
        .map_or_else(WarehouseId::new, WarehouseId::from_uuid);
    let product = state.engine.store().insert_product(Product::new(
        payload.name,
        payload.stock,
        warehouse_id,
    ));
    (StatusCode::CREATED, Json(json!({ "product": product }))).into_response()
}

/// GET `/products/{id}` - Fetch a product's stock level.
async fn get_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.engine.store().product(ProductId::from_uuid(id)) {
        Ok(product) => Json(json!({ "product": product })).into_response(),
        Err(error) => error_response(&error),
    }
}
