//! Gestra API Server
//!
//! Main entry point for the Gestra fiscal engine service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gestra_api::{AppState, create_router};
use gestra_core::EngineStore;
use gestra_shared::AppConfig;
use gestra_shared::types::money::Currency;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gestra=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");
    let currency: Currency = config
        .engine
        .currency
        .parse()
        .map_err(|error: String| anyhow::anyhow!(error))?;
    info!(%currency, "Engine configured");

    // Create the in-memory engine
    let store = Arc::new(EngineStore::new());
    let state = AppState::with_store(store);

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
