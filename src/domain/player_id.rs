//! Type-safe player identifier.
//!
//! [`PlayerId`] is the connection id assigned by the transport layer at
//! connect time. It is opaque to clients and never chosen by them.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for one live connection and its player record.
///
/// Generated server-side as a UUID v4 string, but any string is accepted
/// so that other transports (and tests) can supply their own ids. Used as
/// the key in both [`super::PlayerRegistry`] and
/// [`super::ConnectionRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a new random `PlayerId` backed by a UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wraps an existing connection id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
