//! Error types with HTTP status code mapping.
//!
//! [`ServerError`] is returned by the REST read surface and maps each
//! variant to a status code and a structured JSON body. [`DecodeError`]
//! and [`DeliveryError`] describe the two failures the session core
//! contains locally: malformed inbound messages and per-recipient
//! delivery failures. Neither is ever surfaced to a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tokio::sync::mpsc;
use utoipa::ToSchema;

use crate::domain::PlayerId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "player not found: 5b1c..."
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 2000–2999 | Not Found       | 404 Not Found             |
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No live player with the given id.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),
}

impl ServerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::PlayerNotFound(_) => 2001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::PlayerNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Why an inbound client message was rejected.
///
/// Every variant leads to the same policy: the message is dropped, the
/// store is not touched, and nothing is sent back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Payload is not a JSON object with a string `action` field.
    #[error("malformed message")]
    MalformedJson,

    /// `action` names a message kind outside the supported set.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A `move` message without a well-formed, finite `position`.
    #[error("invalid or missing position")]
    InvalidPosition,
}

/// Why a frame could not be queued for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The recipient's outbound queue is full.
    #[error("outbound queue full")]
    QueueFull,

    /// The recipient's writer has gone away.
    #[error("connection closed")]
    Disconnected,

    /// No connection with that id is registered.
    #[error("connection not registered")]
    NotRegistered,
}

impl<T> From<mpsc::error::TrySendError<T>> for DeliveryError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => Self::QueueFull,
            mpsc::error::TrySendError::Closed(_) => Self::Disconnected,
        }
    }
}
