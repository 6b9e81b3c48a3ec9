//! Session service: applies connection events to the player registry and
//! fans the resulting state out to every live connection.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{
    BroadcastReport, ConnectionRegistry, Frame, GameSnapshot, LeaderboardEntry, PlayerId,
    PlayerRegistry, PlayerState,
};
use crate::error::{DeliveryError, ServerError};
use crate::ws::messages::{ClientMessage, JoinAck, ServerMessage};

/// What handling one inbound message led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// A move was applied and the new state broadcast.
    Moved {
        /// Score after the move.
        score: u64,
    },
    /// A `join` re-sent the private acknowledgment.
    Acknowledged,
    /// The message was valid but referred to a player no longer live.
    Ignored,
    /// The message failed to decode and was dropped.
    Dropped,
}

/// Coordinator for every connection lifecycle event.
///
/// Owns the [`PlayerRegistry`] (state) and the [`ConnectionRegistry`]
/// (fan-out targets). Every mutating method follows the same pattern:
/// mutate the registry → take a snapshot → serialize once → queue the frame
/// on every live connection.
#[derive(Debug, Clone)]
pub struct SessionService {
    players: Arc<PlayerRegistry>,
    connections: Arc<ConnectionRegistry>,
}

impl SessionService {
    /// Creates a new `SessionService`.
    #[must_use]
    pub fn new(players: Arc<PlayerRegistry>, connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            players,
            connections,
        }
    }

    /// Returns a reference to the inner [`PlayerRegistry`].
    #[must_use]
    pub fn players(&self) -> &Arc<PlayerRegistry> {
        &self.players
    }

    /// Brings a new connection live.
    ///
    /// Creates the player, queues the private acknowledgment on `outbound`,
    /// registers `outbound` for broadcasts and broadcasts the new state to
    /// everyone, the joiner included.
    ///
    /// Returns `false` and changes nothing if `id` is already live.
    pub async fn join(&self, id: &PlayerId, outbound: mpsc::Sender<Frame>) -> bool {
        if !self.players.add(id.clone()).await {
            tracing::warn!(player_id = %id, "duplicate connect ignored");
            return false;
        }

        match ServerMessage::JoinAck(JoinAck::success(id.clone())).to_frame() {
            Ok(frame) => {
                if let Err(err) = outbound.try_send(frame) {
                    tracing::debug!(player_id = %id, error = %DeliveryError::from(err), "join ack dropped");
                }
            }
            Err(err) => tracing::error!(player_id = %id, error = %err, "failed to encode join ack"),
        }

        self.connections.register(id.clone(), outbound).await;
        tracing::info!(player_id = %id, "player joined");

        self.broadcast_state().await;
        true
    }

    /// Handles one inbound text payload from `id`.
    ///
    /// Malformed payloads are dropped without a reply. Moves for players
    /// that are no longer live are ignored.
    pub async fn handle_message(&self, id: &PlayerId, text: &str) -> MessageOutcome {
        match ClientMessage::decode(text) {
            Ok(message) => self.dispatch(id, message).await,
            Err(err) => {
                tracing::debug!(player_id = %id, error = %err, "dropping inbound message");
                MessageOutcome::Dropped
            }
        }
    }

    /// Applies an already-decoded message from `id`.
    pub async fn dispatch(&self, id: &PlayerId, message: ClientMessage) -> MessageOutcome {
        match message {
            ClientMessage::Join => {
                if self.players.get(id).await.is_none() {
                    return MessageOutcome::Ignored;
                }
                match ServerMessage::JoinAck(JoinAck::success(id.clone())).to_frame() {
                    Ok(frame) => {
                        if let Err(err) = self.connections.send_to(id, frame).await {
                            tracing::debug!(player_id = %id, error = %err, "join ack dropped");
                        }
                    }
                    Err(err) => {
                        tracing::error!(player_id = %id, error = %err, "failed to encode join ack");
                    }
                }
                MessageOutcome::Acknowledged
            }
            ClientMessage::Move { position } => {
                let Some(score) = self.players.update_position(id, position).await else {
                    tracing::debug!(player_id = %id, "move for unknown player ignored");
                    return MessageOutcome::Ignored;
                };
                tracing::trace!(player_id = %id, x = position.x, y = position.y, score, "player moved");
                self.broadcast_state().await;
                MessageOutcome::Moved { score }
            }
        }
    }

    /// Takes a connection out of the session.
    ///
    /// Removes the player, unregisters its outbound queue and broadcasts
    /// the remaining state to everyone else. Returns `false` without
    /// broadcasting if the player was already gone.
    pub async fn leave(&self, id: &PlayerId) -> bool {
        let removed = self.players.remove(id).await;
        // Dropping the sender closes the socket, so the record is gone first.
        self.connections.unregister(id).await;
        if !removed {
            return false;
        }
        tracing::info!(player_id = %id, "player left");
        self.broadcast_state().await;
        true
    }

    /// Broadcasts the current snapshot to every live connection.
    pub async fn broadcast_state(&self) -> BroadcastReport {
        let snapshot = self.players.snapshot().await;
        let frame = match ServerMessage::State(snapshot).to_frame() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(error = %err, "failed to encode state broadcast");
                return BroadcastReport::default();
            }
        };
        let report = self.connections.broadcast(&frame).await;
        if report.dropped > 0 {
            tracing::warn!(
                delivered = report.delivered,
                dropped = report.dropped,
                "state broadcast partially delivered"
            );
        }
        report
    }

    /// Returns the current full-state snapshot.
    pub async fn snapshot(&self) -> GameSnapshot {
        self.players.snapshot().await
    }

    /// Returns the current top-10 leaderboard.
    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.players.leaderboard().await
    }

    /// Returns a single live player's state.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::PlayerNotFound`] if no such player is live.
    pub async fn player(&self, id: &PlayerId) -> Result<PlayerState, ServerError> {
        self.players
            .get(id)
            .await
            .ok_or_else(|| ServerError::PlayerNotFound(id.clone()))
    }

    /// Returns the number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.len().await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Position, SCORE_INCREMENT};

    fn make_service() -> SessionService {
        SessionService::new(
            Arc::new(PlayerRegistry::new()),
            Arc::new(ConnectionRegistry::new()),
        )
    }

    fn drain(rx: &mut mpsc::Receiver<Frame>) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            let Ok(value) = serde_json::from_str(frame.as_str()) else {
                panic!("frame is not json");
            };
            out.push(value);
        }
        out
    }

    fn player_count(value: &serde_json::Value) -> usize {
        value["players"].as_array().map_or(0, Vec::len)
    }

    #[tokio::test]
    async fn join_sends_ack_then_state() {
        let service = make_service();
        let (tx, mut rx) = mpsc::channel(8);
        let id = PlayerId::from("A");

        assert!(service.join(&id, tx).await);

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames.first().cloned(),
            Some(serde_json::json!({"action": "join", "status": "success", "playerId": "A"}))
        );
        let Some(state) = frames.get(1) else {
            panic!("missing state frame");
        };
        assert_eq!(player_count(state), 1);
        assert_eq!(state["players"][0]["score"], 0);
        assert_eq!(state["players"][0]["position"]["x"], 0.0);
    }

    #[tokio::test]
    async fn duplicate_join_changes_nothing() {
        let service = make_service();
        let (tx1, _rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        let id = PlayerId::from("A");

        assert!(service.join(&id, tx1).await);
        service
            .dispatch(&id, ClientMessage::Move { position: Position::new(1.0, 1.0) })
            .await;

        assert!(!service.join(&id, tx2).await);
        assert!(drain(&mut rx2).is_empty());
        let Ok(state) = service.player(&id).await else {
            panic!("player missing");
        };
        assert_eq!(state.score, SCORE_INCREMENT);
        assert_eq!(service.connection_count().await, 1);
    }

    #[tokio::test]
    async fn move_broadcasts_to_everyone() {
        let service = make_service();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        let a = PlayerId::from("A");
        let b = PlayerId::from("B");
        service.join(&a, tx_a).await;
        service.join(&b, tx_b).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        let outcome = service
            .handle_message(&a, r#"{"action":"move","position":{"x":5,"y":7}}"#)
            .await;
        assert_eq!(outcome, MessageOutcome::Moved { score: SCORE_INCREMENT });

        for rx in [&mut rx_a, &mut rx_b] {
            let frames = drain(rx);
            assert_eq!(frames.len(), 1);
            let Some(state) = frames.first() else {
                panic!("no broadcast");
            };
            assert_eq!(state["players"][0]["position"]["x"], 5.0);
            assert_eq!(state["players"][0]["position"]["y"], 7.0);
            assert_eq!(state["players"][0]["score"], 10);
        }
    }

    #[tokio::test]
    async fn malformed_message_is_dropped_silently() {
        let service = make_service();
        let (tx, mut rx) = mpsc::channel(8);
        let id = PlayerId::from("B");
        service.join(&id, tx).await;
        drain(&mut rx);
        let before = service.snapshot().await.players;

        for payload in [r#"{"action":"move"}"#, "garbage", r#"{"action":"dance"}"#] {
            let outcome = service.handle_message(&id, payload).await;
            assert_eq!(outcome, MessageOutcome::Dropped);
        }

        assert!(drain(&mut rx).is_empty());
        assert_eq!(service.snapshot().await.players, before);
    }

    #[tokio::test]
    async fn join_message_resends_ack_only_to_sender() {
        let service = make_service();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        let a = PlayerId::from("A");
        service.join(&a, tx_a).await;
        service.join(&PlayerId::from("B"), tx_b).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        let outcome = service.handle_message(&a, r#"{"action":"join"}"#).await;
        assert_eq!(outcome, MessageOutcome::Acknowledged);

        let frames = drain(&mut rx_a);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames.first().map(|f| f["status"].clone()), Some("success".into()));
        assert!(drain(&mut rx_b).is_empty());
    }

    #[tokio::test]
    async fn move_after_leave_is_ignored() {
        let service = make_service();
        let (tx, _rx) = mpsc::channel(8);
        let id = PlayerId::from("A");
        service.join(&id, tx).await;
        assert!(service.leave(&id).await);

        let outcome = service
            .dispatch(&id, ClientMessage::Move { position: Position::new(1.0, 2.0) })
            .await;
        assert_eq!(outcome, MessageOutcome::Ignored);
        assert!(service.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn leave_broadcasts_to_remaining_only() {
        let service = make_service();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        let a = PlayerId::from("A");
        service.join(&a, tx_a).await;
        service.join(&PlayerId::from("B"), tx_b).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        assert!(service.leave(&a).await);
        assert!(!service.leave(&a).await);

        assert!(drain(&mut rx_a).is_empty());
        let frames = drain(&mut rx_b);
        assert_eq!(frames.len(), 1);
        let Some(state) = frames.first() else {
            panic!("no broadcast");
        };
        assert_eq!(player_count(state), 1);
        assert_eq!(state["players"][0]["playerId"], "B");
    }

    #[tokio::test]
    async fn slow_connection_does_not_roll_back_or_block() {
        let service = make_service();
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(16);
        let slow = PlayerId::from("slow");
        let fast = PlayerId::from("fast");
        service.join(&slow, slow_tx).await;
        service.join(&fast, fast_tx).await;
        drain(&mut fast_rx);

        for step in 1..=3u64 {
            let coord = step as f64;
            let outcome = service
                .dispatch(&fast, ClientMessage::Move { position: Position::new(coord, coord) })
                .await;
            assert_eq!(outcome, MessageOutcome::Moved { score: step * SCORE_INCREMENT });
        }

        assert_eq!(drain(&mut fast_rx).len(), 3);
        let Ok(state) = service.player(&fast).await else {
            panic!("player missing");
        };
        assert_eq!(state.score, 3 * SCORE_INCREMENT);
    }

    #[tokio::test]
    async fn player_lookup_reports_not_found() {
        let service = make_service();
        let result = service.player(&PlayerId::from("nobody")).await;
        assert!(matches!(result, Err(ServerError::PlayerNotFound(_))));
    }
}
