//! WebSocket message types: inbound actions and outbound payloads.
//!
//! Inbound payloads are decoded into the closed [`ClientMessage`] set.
//! Anything else is a [`DecodeError`] and gets dropped by the caller.

use serde::{Deserialize, Serialize};

use crate::domain::{Frame, GameSnapshot, PlayerId, Position};
use crate::error::DecodeError;

/// Messages a client can send.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// `{"action":"join"}`. Informational; the player already exists.
    Join,
    /// `{"action":"move","position":{"x":..,"y":..}}`.
    Move {
        /// Requested new position.
        position: Position,
    },
}

/// Raw envelope: only the discriminator is required up front.
#[derive(Debug, Deserialize)]
struct Envelope {
    action: String,
}

#[derive(Debug, Deserialize)]
struct MovePayload {
    position: Position,
}

impl ClientMessage {
    /// Decodes a JSON text payload.
    ///
    /// Unknown fields are ignored. `x` and `y` must be JSON numbers.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the payload is not a JSON object with a
    /// string `action`, names an unsupported action, or is a `move` without
    /// a finite numeric position.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|_| DecodeError::MalformedJson)?;
        let envelope = Envelope::deserialize(&value).map_err(|_| DecodeError::MalformedJson)?;

        match envelope.action.as_str() {
            "join" => Ok(Self::Join),
            "move" => {
                let payload =
                    MovePayload::deserialize(&value).map_err(|_| DecodeError::InvalidPosition)?;
                if !payload.position.is_finite() {
                    return Err(DecodeError::InvalidPosition);
                }
                Ok(Self::Move {
                    position: payload.position,
                })
            }
            other => Err(DecodeError::UnknownAction(other.to_string())),
        }
    }
}

/// Private acknowledgment sent to a client after it joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinAck {
    /// Always `"join"`.
    pub action: String,
    /// Always `"success"`.
    pub status: String,
    /// The connection id the server assigned.
    pub player_id: PlayerId,
}

impl JoinAck {
    /// Builds a successful join acknowledgment for `player_id`.
    #[must_use]
    pub fn success(player_id: PlayerId) -> Self {
        Self {
            action: "join".to_string(),
            status: "success".to_string(),
            player_id,
        }
    }
}

/// Messages the server sends.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// Sent only to the joining connection.
    JoinAck(JoinAck),
    /// Full-state broadcast sent to every live connection.
    State(GameSnapshot),
}

impl ServerMessage {
    /// Serializes the message into a frame ready to queue.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_frame(&self) -> Result<Frame, serde_json::Error> {
        serde_json::to_string(self).map(Frame::from)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::PlayerState;

    #[test]
    fn decodes_join() {
        assert_eq!(ClientMessage::decode(r#"{"action":"join"}"#), Ok(ClientMessage::Join));
    }

    #[test]
    fn join_ignores_extra_fields() {
        let msg = ClientMessage::decode(r#"{"action":"join","playerId":"test"}"#);
        assert_eq!(msg, Ok(ClientMessage::Join));
    }

    #[test]
    fn decodes_move_with_integer_coordinates() {
        let msg = ClientMessage::decode(r#"{"action":"move","position":{"x":5,"y":7}}"#);
        assert_eq!(
            msg,
            Ok(ClientMessage::Move {
                position: Position::new(5.0, 7.0)
            })
        );
    }

    #[test]
    fn move_without_position_is_invalid() {
        let msg = ClientMessage::decode(r#"{"action":"move"}"#);
        assert_eq!(msg, Err(DecodeError::InvalidPosition));
    }

    #[test]
    fn move_with_string_coordinates_is_invalid() {
        let msg = ClientMessage::decode(r#"{"action":"move","position":{"x":"5","y":7}}"#);
        assert_eq!(msg, Err(DecodeError::InvalidPosition));
    }

    #[test]
    fn move_with_missing_axis_is_invalid() {
        let msg = ClientMessage::decode(r#"{"action":"move","position":{"x":1}}"#);
        assert_eq!(msg, Err(DecodeError::InvalidPosition));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let msg = ClientMessage::decode(r#"{"action":"teleport"}"#);
        assert_eq!(msg, Err(DecodeError::UnknownAction("teleport".to_string())));
    }

    #[test]
    fn garbage_and_non_objects_are_malformed() {
        for payload in ["not json", "[]", "42", r#"{"action":7}"#, r#"{"kind":"move"}"#] {
            assert_eq!(
                ClientMessage::decode(payload),
                Err(DecodeError::MalformedJson),
                "payload: {payload}"
            );
        }
    }

    #[test]
    fn join_ack_wire_shape() {
        let msg = ServerMessage::JoinAck(JoinAck::success(PlayerId::from("abc")));
        let Ok(frame) = msg.to_frame() else {
            panic!("serialization failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(frame.as_str()) else {
            panic!("invalid json");
        };
        assert_eq!(
            value,
            serde_json::json!({"action": "join", "status": "success", "playerId": "abc"})
        );
    }

    #[test]
    fn state_wire_shape() {
        let snapshot = GameSnapshot {
            players: vec![PlayerState {
                player_id: PlayerId::from("A"),
                position: Position::new(5.0, 7.0),
                score: 10,
            }],
            timestamp: Utc::now(),
        };
        let Ok(frame) = ServerMessage::State(snapshot).to_frame() else {
            panic!("serialization failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(frame.as_str()) else {
            panic!("invalid json");
        };
        assert_eq!(value["players"][0]["playerId"], "A");
        assert_eq!(value["players"][0]["position"]["x"], 5.0);
        assert_eq!(value["players"][0]["score"], 10);
        let Some(ts) = value["timestamp"].as_str() else {
            panic!("timestamp missing");
        };
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }
}
