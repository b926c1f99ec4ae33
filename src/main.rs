//! Warehouse Seal Tracker Backend
//!
//! Records security seals against departments and keeps a filtered, exportable
//! view of them, with all persistence delegated to a relational seal store.

mod api;
mod config;
mod errors;
mod inventory;
mod models;
mod store;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, StoreBackend};
use inventory::InventoryViewModel;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryViewModel>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Warehouse Seal Tracker Backend");
    tracing::info!("Seal store: {}", config.store.name());
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.store == StoreBackend::Memory {
        tracing::warn!("Using the in-memory seal store. Records are lost on restart!");
    }

    // Open the seal store and load the initial list
    let store = store::open(&config.store).await?;
    let inventory = Arc::new(InventoryViewModel::new(store, &config.csv_date_format));

    if inventory.reload().await {
        tracing::info!(
            "Loaded {} seal records",
            inventory.snapshot().await.records.len()
        );
    }

    let state = AppState { inventory };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        .route("/departments", get(api::list_departments))
        // Seals
        .route("/seals", get(api::list_seals))
        .route("/seals", post(api::intake_seal))
        .route("/seals/reload", post(api::reload_seals))
        .route("/seals/export.csv", get(api::export_seals))
        .route("/seals/{id}", delete(api::delete_seal))
        .route("/seals/{id}/apply", post(api::apply_seal))
        // Form state
        .route("/view", get(api::get_view))
        .route("/view", put(api::update_view))
        .route("/draft", put(api::update_draft))
        .route("/draft/submit", post(api::submit_draft));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
