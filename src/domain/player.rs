//! Player record: position and score of one live connection.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PlayerId;

/// Points awarded for every accepted position update.
pub const SCORE_INCREMENT: u64 = 10;

/// A point on the shared play field. No bounds are enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a position from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Server-side state for one connected participant.
///
/// Stored behind its own lock in [`super::PlayerRegistry`] so that
/// `position` and `score` are always read and written together.
#[derive(Debug, Clone)]
pub struct Player {
    /// Connection id (immutable after creation).
    pub id: PlayerId,

    /// Last accepted position.
    pub position: Position,

    /// Accumulated score. Only ever increases.
    pub score: u64,

    /// Monotonic join sequence, used as the leaderboard tie-break.
    pub join_seq: u64,
}

impl Player {
    /// Creates a player at the origin with a zero score.
    #[must_use]
    pub fn new(id: PlayerId, join_seq: u64) -> Self {
        Self {
            id,
            position: Position::default(),
            score: 0,
            join_seq,
        }
    }

    /// Applies an accepted move: replaces the position and awards
    /// [`SCORE_INCREMENT`]. Returns the new score.
    pub fn apply_move(&mut self, position: Position) -> u64 {
        self.position = position;
        self.score = self.score.saturating_add(SCORE_INCREMENT);
        self.score
    }
}

/// Public projection of a [`Player`], as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Connection id.
    pub player_id: PlayerId,
    /// Current position.
    pub position: Position,
    /// Current score.
    pub score: u64,
}

impl From<&Player> for PlayerState {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id.clone(),
            position: player.position,
            score: player.score,
        }
    }
}
