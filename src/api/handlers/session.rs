//! Read-only session endpoints: leaderboard, full state, single player.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::{GameSnapshot, LeaderboardEntry, PlayerId, PlayerState};
use crate::error::{ErrorResponse, ServerError};

/// `GET /leaderboard` — Top 10 players by score.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "Session",
    summary = "Leaderboard",
    description = "Returns up to 10 live players ordered by score, highest first. Ties keep join order.",
    responses(
        (status = 200, description = "Ranked players", body = Vec<LeaderboardEntry>),
    )
)]
pub async fn leaderboard(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session_service.leaderboard().await)
}

/// `GET /game-state` — Full snapshot, same shape as the WebSocket broadcast.
#[utoipa::path(
    get,
    path = "/game-state",
    tag = "Session",
    summary = "Current game state",
    description = "Returns every live player's position and score plus the capture timestamp.",
    responses(
        (status = 200, description = "Game snapshot", body = GameSnapshot),
    )
)]
pub async fn game_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session_service.snapshot().await)
}

/// `GET /players/{id}` — One live player.
///
/// # Errors
///
/// Returns [`ServerError::PlayerNotFound`] if the player is not live.
#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "Session",
    summary = "Get player",
    description = "Returns the position and score of a single live player.",
    params(
        ("id" = String, Path, description = "Connection id"),
    ),
    responses(
        (status = 200, description = "Player state", body = PlayerState),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let player = state.session_service.player(&PlayerId::from(id)).await?;
    Ok(Json(player))
}

/// Session read routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/game-state", get(game_state))
        .route("/players/{id}", get(get_player))
}
