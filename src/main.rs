// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::controller::DashboardController;
use crate::application::rate_store::RateStore;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::sqlite_store::SqliteStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_demo_pair, change_page, delete_pair, get_view, health_check, import_pair, list_pairs,
    update_pair, update_selection,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create store (infrastructure layer)
    let store: Arc<dyn RateStore> = Arc::new(SqliteStore::open(&config.database.path)?);

    // Create controller (application layer)
    let mut controller = DashboardController::new(store.clone(), &config.dashboard)?;
    if config.dashboard.seed_demo_pair && controller.seed_demo_if_empty(&mut rand::thread_rng())? {
        tracing::info!("Seeded demo pair into empty store");
    }

    let state = Arc::new(AppState::new(store, controller));

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/view", get(get_view))
        .route("/selection", post(update_selection))
        .route("/page", post(change_page))
        .route("/pairs", get(list_pairs).put(update_pair).delete(delete_pair))
        .route("/pairs/import", post(import_pair))
        .route("/pairs/demo", post(add_demo_pair))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting rate dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
