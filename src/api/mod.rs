//! REST API layer: read-only route handlers, OpenAPI document and router
//! composition.

pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI description of the HTTP read surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "arena-sync", description = "Real-time multiplayer session synchronizer"),
    paths(
        handlers::session::leaderboard,
        handlers::session::game_state,
        handlers::session::get_player,
        handlers::system::health_handler,
    ),
    tags(
        (name = "Session", description = "Live player state and leaderboard"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the REST router with all read endpoints and the OpenAPI docs.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(docs_router())
}

/// Builds the complete application: REST, WebSocket, tracing and CORS.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::config::ConnectionSettings;
    use crate::domain::{PlayerId, Position};
    use crate::ws::messages::ClientMessage;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("invalid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("request failed");
        };
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(value) = serde_json::from_slice(&bytes) else {
            panic!("body is not json");
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_connection_count() {
        let (state, _shutdown) = AppState::new(ConnectionSettings::default());
        let (status, body) = get_json(build_app(state), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["connections"], 0);
    }

    #[tokio::test]
    async fn leaderboard_lists_top_players() {
        let (state, _shutdown) = AppState::new(ConnectionSettings::default());
        let service = &state.session_service;
        let (tx_a, _rx_a) = mpsc::channel(64);
        let (tx_b, _rx_b) = mpsc::channel(64);
        let a = PlayerId::from("A");
        let b = PlayerId::from("B");
        service.join(&a, tx_a).await;
        service.join(&b, tx_b).await;
        service
            .dispatch(&b, ClientMessage::Move { position: Position::new(1.0, 1.0) })
            .await;

        let (status, body) = get_json(build_app(state.clone()), "/leaderboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!([
                {"playerId": "B", "score": 10},
                {"playerId": "A", "score": 0},
            ])
        );
    }

    #[tokio::test]
    async fn game_state_matches_broadcast_shape() {
        let (state, _shutdown) = AppState::new(ConnectionSettings::default());
        let (tx, _rx) = mpsc::channel(64);
        let a = PlayerId::from("A");
        state.session_service.join(&a, tx).await;
        state
            .session_service
            .dispatch(&a, ClientMessage::Move { position: Position::new(5.0, 7.0) })
            .await;

        let (status, body) = get_json(build_app(state.clone()), "/game-state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["players"][0]["playerId"], "A");
        assert_eq!(body["players"][0]["position"]["x"], 5.0);
        assert_eq!(body["players"][0]["position"]["y"], 7.0);
        assert_eq!(body["players"][0]["score"], 10);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_player_returns_structured_404() {
        let (state, _shutdown) = AppState::new(ConnectionSettings::default());
        let (status, body) = get_json(build_app(state), "/players/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (state, _shutdown) = AppState::new(ConnectionSettings::default());
        let (status, body) = get_json(build_app(state), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/leaderboard"].is_object());
        assert!(body["paths"]["/game-state"].is_object());
    }
}
