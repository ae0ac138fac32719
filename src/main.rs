// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{routing::get, Router};
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::live_view::LiveView;
use crate::infrastructure::config::load_viewer_config;
use crate::infrastructure::watch_renderer::WatchRenderer;
use crate::infrastructure::websocket_source::WebSocketConnector;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{chart_descriptor, current_window, health_check, stream_window};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_viewer_config().context("failed to load viewer configuration")?;

    // Renderer bridge target (infrastructure layer)
    let (renderer, window_rx) = WatchRenderer::new(config.window.capacity);

    // One live view per process lifetime (application layer)
    let view = LiveView::new(
        Arc::new(WebSocketConnector),
        config.source.address.clone(),
        &config.source.value_field,
        config.window.capacity,
        Box::new(renderer),
    );
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let view_task = tokio::spawn(view.run(async {
        let _ = stop_rx.await;
    }));

    // Create application state
    let state = Arc::new(AppState {
        chart: config.chart.clone(),
        capacity: config.window.capacity,
        window: window_rx,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/chart", get(chart_descriptor))
        .route("/window", get(current_window))
        .route("/window/stream", get(stream_window))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind address {:?}", config.server.bind))?;
    tracing::info!(%addr, source = %config.source.address, "starting eeg-live-viewer");

    // Stopping the view drops the watch sender, which ends open snapshot streams
    // so the server can drain.
    let shutdown = async move {
        shutdown_signal().await;
        let _ = stop_tx.send(());
    };
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    let outcome = view_task.await.context("live view task panicked")?;
    tracing::info!(
        exit = ?outcome.exit,
        published = outcome.stats.published,
        "shutdown complete"
    );

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("ctrl-c received, shutting down");
}
