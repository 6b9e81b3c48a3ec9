//! WebSocket layer: connection handling and the message codec.
//!
//! The WebSocket endpoint at `/ws` is the session transport: connecting
//! joins, `move` messages update the player, and disconnecting leaves.
//! Every state change is pushed to all live connections.

pub mod connection;
pub mod handler;
pub mod messages;
