//! # arena-sync
//!
//! Real-time multiplayer session synchronizer.
//!
//! Clients connect over WebSocket, each connection becomes a player with a
//! position and a score, and every state change is pushed to all live
//! connections. A ranked leaderboard and the full state are also exposed
//! over plain HTTP.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler + Connection loop (ws/)
//!     │
//!     ├── SessionService (service/)
//!     │
//!     ├── PlayerRegistry (domain/)       per-player locks, projections
//!     └── ConnectionRegistry (domain/)   bounded outbound queue per client
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
