//! Concurrent player storage with per-player fine-grained locking.
//!
//! [`PlayerRegistry`] stores all live players in a `HashMap` where each
//! entry is individually protected by a [`tokio::sync::RwLock`]. Moves on
//! different players only share the outer read lock, so they never
//! serialize behind each other. Only joins and leaves take the outer
//! write lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use super::snapshot::{GameSnapshot, LEADERBOARD_SIZE, LeaderboardEntry};
use super::{Player, PlayerId, PlayerState, Position};

/// The state store: connection id → [`Player`].
///
/// # Concurrency
///
/// - `add` / `remove` hold the outer write lock for the duration of a
///   single map insert or delete.
/// - `update_position` holds the outer read lock only long enough to clone
///   the per-player `Arc`, then writes that player under its own lock.
/// - `snapshot` / `leaderboard` hold the outer read lock while scanning,
///   reading each player under its own lock. Membership is fixed for the
///   scan and every entry has its position and score from the same write.
///
/// Locks are always taken outer before inner, so no operation can
/// deadlock against another.
#[derive(Debug)]
pub struct PlayerRegistry {
    players: RwLock<HashMap<PlayerId, Arc<RwLock<Player>>>>,
    next_join_seq: AtomicU64,
}

impl PlayerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
            next_join_seq: AtomicU64::new(0),
        }
    }

    /// Inserts a new player at `(0, 0)` with score `0`.
    ///
    /// Returns `false` and leaves the existing record untouched if `id` is
    /// already present.
    pub async fn add(&self, id: PlayerId) -> bool {
        let mut map = self.players.write().await;
        if map.contains_key(&id) {
            return false;
        }
        let seq = self.next_join_seq.fetch_add(1, Ordering::Relaxed);
        map.insert(id.clone(), Arc::new(RwLock::new(Player::new(id, seq))));
        true
    }

    /// Removes the player with the given id.
    ///
    /// Returns `true` if a record was removed, `false` if none existed.
    pub async fn remove(&self, id: &PlayerId) -> bool {
        self.players.write().await.remove(id).is_some()
    }

    /// Replaces the player's position and awards the move increment.
    ///
    /// Returns the new score, or `None` if no player with `id` exists. An
    /// unknown id never creates a record.
    pub async fn update_position(&self, id: &PlayerId, position: Position) -> Option<u64> {
        let entry = {
            let map = self.players.read().await;
            Arc::clone(map.get(id)?)
        };
        let mut player = entry.write().await;
        Some(player.apply_move(position))
    }

    /// Returns the public state of one player.
    pub async fn get(&self, id: &PlayerId) -> Option<PlayerState> {
        let entry = {
            let map = self.players.read().await;
            Arc::clone(map.get(id)?)
        };
        let player = entry.read().await;
        Some(PlayerState::from(&*player))
    }

    /// Captures every live player, ordered by join sequence.
    pub async fn snapshot(&self) -> GameSnapshot {
        let players = self
            .collect()
            .await
            .into_iter()
            .map(|(_, state)| state)
            .collect();
        GameSnapshot {
            players,
            timestamp: Utc::now(),
        }
    }

    /// Returns the top [`LEADERBOARD_SIZE`] players by score, descending.
    ///
    /// Ties are broken by join order: the player who joined first ranks
    /// higher.
    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut rows = self.collect().await;
        rows.sort_by(|(seq_a, a), (seq_b, b)| b.score.cmp(&a.score).then(seq_a.cmp(seq_b)));
        rows.truncate(LEADERBOARD_SIZE);
        rows.into_iter()
            .map(|(_, state)| LeaderboardEntry {
                player_id: state.player_id,
                score: state.score,
            })
            .collect()
    }

    /// Returns the number of live players.
    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    /// Returns `true` if no players are live.
    pub async fn is_empty(&self) -> bool {
        self.players.read().await.is_empty()
    }

    /// Scans the registry under the outer read lock, returning each
    /// player's join sequence and state, sorted by join sequence.
    async fn collect(&self) -> Vec<(u64, PlayerState)> {
        let map = self.players.read().await;
        let mut rows = Vec::with_capacity(map.len());
        for entry in map.values() {
            let player = entry.read().await;
            rows.push((player.join_seq, PlayerState::from(&*player)));
        }
        drop(map);
        rows.sort_by_key(|(seq, _)| *seq);
        rows
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
