// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
mod widgets;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::tile_service::TileService;
use crate::application::widget_registry::WidgetRegistry;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::json_layout_store::JsonLayoutStore;
use crate::presentation::app_state::AppState;
use crate::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = load_settings().context("failed to load settings")?;

    // Widget registry
    let mut registry = WidgetRegistry::new();
    widgets::register_all(&mut registry);
    let registry = Arc::new(registry);
    tracing::info!("Registered {} widget types", registry.len());

    // Layout store (infrastructure layer)
    let store = Arc::new(JsonLayoutStore::new(&settings.layout.path));

    // Services (application layer)
    let client = reqwest::Client::builder()
        .timeout(settings.fetch.timeout())
        .build()
        .context("failed to build HTTP client")?;
    let tile_service = TileService::new(
        registry.clone(),
        client,
        settings.backends.clone(),
        settings.weather.clone(),
        settings.fetch.timeout(),
    );

    let state = Arc::new(AppState::new(registry, store, tile_service));
    state.controller.lock().await.mount().await;

    // Compression is applied per response, so no CompressionLayer here
    let app = router(state);

    let addr: SocketAddr = settings
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", settings.server.bind))?;
    tracing::info!("Starting dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
