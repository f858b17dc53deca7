//! HTTP dashboard and JSON API.
//!
//! Handlers only read the published result and discovery snapshots; the
//! sweep runs in its own task, so a slow sweep never delays a request.

mod handlers;
mod types;

use std::net::SocketAddr;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;

use handlers::{
    api_urls_handler, cache_clear_handler, cache_force_refresh_handler, cache_info_handler,
    dashboard_handler, exclude_handler, health_handler, memory_handler, refresh_handler,
    version_handler,
};
pub use handlers::{current_memory_usage, render_dashboard};
pub use types::{
    AppState, ErrorResponse, MemoryResponse, MessageResponse, UrlsResponse, VersionResponse,
};

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/api/urls", get(api_urls_handler))
        .route("/refresh", get(refresh_handler))
        .route("/api/exclude", post(exclude_handler))
        .route("/health", get(health_handler))
        .route("/memory", get(memory_handler))
        .route("/cache", get(cache_info_handler))
        .route("/cache/clear", post(cache_clear_handler))
        .route("/cache/force-refresh", post(cache_force_refresh_handler))
        .route("/version", get(version_handler))
        .with_state(state)
}

/// Serves the router on `bind_address:port` until `shutdown` fires.
pub async fn start_status_server(
    bind_address: &str,
    port: u16,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((bind_address, port))
        .await
        .with_context(|| format!("Failed to bind web server to {bind_address}:{port}"))?;
    let addr: SocketAddr = listener
        .local_addr()
        .context("Failed to read web server address")?;

    log::info!("Dashboard listening on http://{addr}/");
    log::info!("  - API: http://{addr}/api/urls");
    log::info!("  - Health: http://{addr}/health");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Web server error")?;

    log::info!("Web server stopped");
    Ok(())
}
