//! HTTP API layer with Axum routes over the fiscal engine.
//!
//! This crate provides:
//! - REST routes for documents, series, parties, registers, products and
//!   the stock movement log
//! - A JSON error envelope derived from the engine's error taxonomy
//! - Request tracing and CORS layers

pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use gestra_core::{DocumentLifecycle, EngineStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The fiscal engine orchestrator.
    pub engine: Arc<DocumentLifecycle>,
}

impl AppState {
    /// Creates state over a fresh in-memory engine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(EngineStore::new()))
    }

    /// Creates state over an existing store.
    #[must_use]
    pub fn with_store(store: Arc<EngineStore>) -> Self {
        Self {
            engine: Arc::new(DocumentLifecycle::new(store)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
