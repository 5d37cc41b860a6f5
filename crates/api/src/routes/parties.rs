//! Party (client/supplier) ledger routes.

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

use gestra_core::ledger::reconcile;
use gestra_core::ledger::types::{PartyKind, PartyLedger};
use gestra_shared::types::PartyId;

use crate::AppState;

use super::error_response;

/// Creates the party routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parties", post(create_party))
        .route("/parties/{id}", get(get_party))
        .route("/parties/{id}/reconciliation", get(get_reconciliation))
}

/// Request body for registering a party.
#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    /// Party name.
    pub name: String,
    /// Client or supplier.
    pub kind: PartyKind,
}

/// POST `/parties` - Register a client or supplier.
async fn create_party(
    State(state): State<AppState>,
    Json(payload): Json<CreatePartyRequest>,
) -> impl IntoResponse {
    let party = state
        .engine
        .store()
        .insert_party(PartyLedger::new(payload.kind, payload.name));
    (StatusCode::CREATED, Json(json!({ "party": party }))).into_response()
}

/// GET `/parties/{id}` - Fetch a party's balance and transaction history.
async fn get_party(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.engine.store().party(PartyId::from_uuid(id)) {
        Ok(party) => Json(json!({ "party": party })).into_response(),
        Err(error) => error_response(&error),
    }
}

/// GET `/parties/{id}/reconciliation` - Audit the cached balance against
/// the transaction history.
async fn get_reconciliation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.engine.store().party(PartyId::from_uuid(id)) {
        Ok(party) => Json(json!({ "reconciliation": reconcile(&party) })).into_response(),
        Err(error) => error_response(&error),
    }
}
