//! arena-sync server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket session endpoint and the
//! read-only REST surface.

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use arena_sync::api;
use arena_sync::app_state::AppState;
use arena_sync::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ServerConfig::from_env().context("invalid LISTEN_ADDR")?;
    tracing::info!(addr = %config.listen_addr, "starting arena-sync");

    let (app_state, shutdown_tx) = AppState::new(config.connection_settings());
    let session_service = std::sync::Arc::clone(&app_state.session_service);
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("shutdown requested; closing live connections");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("server error")?;

    // Upgraded sockets are not tracked by the server; wait for each
    // connection task to run its own disconnect path.
    let deadline = tokio::time::Instant::now().checked_add(config.shutdown_grace());
    while !session_service.players().is_empty().await {
        if deadline.is_none_or(|at| tokio::time::Instant::now() >= at) {
            tracing::warn!(
                remaining = session_service.players().len().await,
                "shutdown grace period elapsed with players still live"
            );
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
