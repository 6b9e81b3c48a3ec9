//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::ConnectionSettings;
use crate::domain::{ConnectionRegistry, PlayerRegistry};
use crate::service::SessionService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session service for all state mutations and projections.
    pub session_service: Arc<SessionService>,
    /// Delivery settings applied to every new connection.
    pub connection_settings: ConnectionSettings,
    /// Flips to `true` when the server begins shutting down.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// Builds the state with fresh, empty registries.
    ///
    /// Returns the state together with the sender that triggers shutdown.
    #[must_use]
    pub fn new(connection_settings: ConnectionSettings) -> (Self, watch::Sender<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let session_service = Arc::new(SessionService::new(
            Arc::new(PlayerRegistry::new()),
            Arc::new(ConnectionRegistry::new()),
        ));
        let state = Self {
            session_service,
            connection_settings,
            shutdown: shutdown_rx,
        };
        (state, shutdown_tx)
    }
}
