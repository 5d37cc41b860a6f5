//! Document lifecycle routes.
//!
//! Drafts come in from UI collaborators; certification, liquidation,
//! cancellation and derivation run through the engine and return the
//! updated read models.

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
use tracing::warn;
use uuid::Uuid;

use gestra_core::document::{DocumentType, PaymentMethod};
use gestra_core::lifecycle::{DraftDocumentInput, LiquidateInput};
use gestra_shared::types::{CashRegisterId, DocumentId};

use crate::AppState;

use super::error_response;

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", post(create_document))
        .route("/documents", get(list_documents))
        .route("/documents/{id}", get(get_document))
        .route("/documents/{id}/certify", post(certify_document))
        .route("/documents/{id}/liquidate", post(liquidate_document))
        .route("/documents/{id}/cancel", post(cancel_document))
        .route("/documents/{id}/derive", post(derive_document))
        .route("/documents/{id}/attachment", post(attach_document))
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct LiquidateRequest {
    /// Payment amount.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// Register the payment goes into.
    pub cash_register_id: Uuid,
}

/// Request body for cancelling a document.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    /// Free-text cancellation reason.
    pub reason: String,
}

/// Request body for deriving a new draft.
#[derive(Debug, Deserialize)]
pub struct DeriveRequest {
    /// The type of the derived draft.
    pub target_type: DocumentType,
}

/// Request body for attaching an external reference.
#[derive(Debug, Deserialize)]
pub struct AttachRequest {
    /// Attachment reference (storage is external to the engine).
    pub reference: String,
}

/// POST `/documents` - Store a draft document.
async fn create_document(
    State(state): State<AppState>,
    Json(payload): Json<DraftDocumentInput>,
) -> impl IntoResponse {
    match state.engine.create(payload) {
        Ok(document) => {
            (StatusCode::CREATED, Json(json!({ "document": document }))).into_response()
        }
        Err(error) => {
            warn!(error = %error, "draft creation rejected");
            error_response(&error)
        }
    }
}

/// GET `/documents` - List all documents, newest first.
async fn list_documents(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.store().list_documents() {
        Ok(documents) => Json(json!({ "documents": documents })).into_response(),
        Err(error) => error_response(&error),
    }
}

/// GET `/documents/{id}` - Fetch one document.
async fn get_document(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.engine.store().document(DocumentId::from_uuid(id)) {
        Ok(document) => Json(json!({ "document": document })).into_response(),
        Err(error) => error_response(&error),
    }
}

/// POST `/documents/{id}/certify` - Certify a document.
async fn certify_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.engine.certify(DocumentId::from_uuid(id)) {
        Ok(document) => Json(json!({ "document": document })).into_response(),
        Err(error) => {
            warn!(document_id = %id, error = %error, "certification failed");
            error_response(&error)
        }
    }
}

/// POST `/documents/{id}/liquidate` - Record a payment against a document.
async fn liquidate_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LiquidateRequest>,
) -> impl IntoResponse {
    let input = LiquidateInput {
        document_id: DocumentId::from_uuid(id),
        amount: payload.amount,
        method: payload.method,
        cash_register_id: CashRegisterId::from_uuid(payload.cash_register_id),
    };
    match state.engine.liquidate(input) {
        Ok(outcome) => Json(json!({
            "document": outcome.document,
            "receipt": outcome.receipt,
        }))
        .into_response(),
        Err(error) => {
            warn!(document_id = %id, error = %error, "liquidation failed");
            error_response(&error)
        }
    }
}

/// POST `/documents/{id}/cancel` - Cancel a document via its reversal.
async fn cancel_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelRequest>,
) -> impl IntoResponse {
    match state.engine.cancel(DocumentId::from_uuid(id), &payload.reason) {
        Ok(outcome) => Json(json!({
            "document": outcome.document,
            "reversal": outcome.reversal,
        }))
        .into_response(),
        Err(error) => {
            warn!(document_id = %id, error = %error, "cancellation failed");
            error_response(&error)
        }
    }
}

/// POST `/documents/{id}/derive` - Derive a new draft from a document.
async fn derive_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeriveRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .derive(DocumentId::from_uuid(id), payload.target_type)
    {
        Ok(document) => {
            (StatusCode::CREATED, Json(json!({ "document": document }))).into_response()
        }
        Err(error) => {
            warn!(document_id = %id, error = %error, "derivation failed");
            error_response(&error)
        }
    }
}

/// POST `/documents/{id}/attachment` - Attach an external reference.
async fn attach_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .attach(DocumentId::from_uuid(id), &payload.reference)
    {
        Ok(document) => Json(json!({ "document": document })).into_response(),
        Err(error) => {
            warn!(document_id = %id, error = %error, "attachment failed");
            error_response(&error)
        }
    }
}
