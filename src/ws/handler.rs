//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to WebSocket and join the session.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let service = std::sync::Arc::clone(&state.session_service);
    let settings = state.connection_settings;
    let shutdown = state.shutdown.clone();

    ws.on_upgrade(move |socket| run_connection(socket, service, settings, shutdown))
}
