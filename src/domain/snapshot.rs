//! Read projections over the player registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PlayerId, PlayerState};

/// Number of entries returned by the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Point-in-time view of every live player.
///
/// This is both the broadcast payload and the `GET /game-state` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GameSnapshot {
    /// All live players, ordered by join sequence.
    pub players: Vec<PlayerState>,
    /// Capture time.
    pub timestamp: DateTime<Utc>,
}

impl GameSnapshot {
    /// Returns the state of a single player, if present.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| &p.player_id == id)
    }

    /// Returns the number of players in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if no players are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Connection id.
    pub player_id: PlayerId,
    /// Current score.
    pub score: u64,
}
