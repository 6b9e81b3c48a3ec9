//! Service layer: session orchestration.
//!
//! [`SessionService`] applies connection events to the
//! [`super::domain::PlayerRegistry`] and broadcasts the result through the
//! [`super::domain::ConnectionRegistry`].

pub mod session_service;

pub use session_service::{MessageOutcome, SessionService};
