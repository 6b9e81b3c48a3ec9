//! Domain layer: player identity, the player registry, read projections,
//! and the live-connection registry used for broadcast.
//!
//! Nothing in this module knows about WebSocket framing; the only
//! transport-facing type is the serialized [`Frame`] queued per
//! connection.

pub mod connection_registry;
pub mod player;
pub mod player_id;
pub mod player_registry;
pub mod snapshot;

pub use connection_registry::{BroadcastReport, ConnectionRegistry, Frame};
pub use player::{Player, PlayerState, Position, SCORE_INCREMENT};
pub use player_id::PlayerId;
pub use player_registry::PlayerRegistry;
pub use snapshot::{GameSnapshot, LEADERBOARD_SIZE, LeaderboardEntry};
