//! Client and server message envelopes.
//!
//! Every frame is a JSON object with a `kind` discriminator and, for most
//! variants, a `value` payload.
//!
//! | Direction | Kinds |
//! |-----------|-------|
//! | Client → Server | `Auth`, `Move` |
//! | Server → Client | `Move`, `GameEnd`, `Error`, `AuthSuccess`, `MoveHistory`, `Pong` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identifiers::{GameId, UserId};

use super::game::{Outcome, ServerErrorValue};

// ============================================================================
// Constants
// ============================================================================

/// Every `kind` this client understands.
const KNOWN_KINDS: &[&str] = &[
    "Move",
    "GameEnd",
    "Error",
    "AuthSuccess",
    "MoveHistory",
    "Pong",
];

// ============================================================================
// ClientMessage
// ============================================================================

/// A message sent from the client to the game server.
///
/// # Format
///
/// ```json
/// {"kind": "Auth", "value": {"game_id": "g1", "user_id": "alice"}}
/// {"kind": "Move", "value": "e4"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ClientMessage {
    /// Handshake; must be the first message on every connection.
    Auth {
        /// Game to join.
        game_id: GameId,
        /// Joining player.
        user_id: UserId,
    },
    /// A move in the notation the server expects (SAN).
    Move(String),
}

impl ClientMessage {
    /// Creates an `Auth` message.
    #[inline]
    #[must_use]
    pub fn auth(game_id: GameId, user_id: UserId) -> Self {
        Self::Auth { game_id, user_id }
    }

    /// Creates a `Move` message.
    #[inline]
    #[must_use]
    pub fn play(mv: impl Into<String>) -> Self {
        Self::Move(mv.into())
    }

    /// Serializes the message to its JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialization`](crate::Error::Deserialization) if
    /// serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// ServerMessage
// ============================================================================

/// A message pushed by the game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ServerMessage {
    /// Opponent (or echoed own) move.
    Move(String),
    /// Game finished.
    GameEnd(Outcome),
    /// Server-side error report.
    Error(ServerErrorValue),
    /// Handshake accepted.
    AuthSuccess,
    /// Full move list, sent after (re)joining.
    MoveHistory(Vec<String>),
    /// Keep-alive; carries nothing.
    Pong,
}

// ============================================================================
// Inbound
// ============================================================================

/// Result of decoding one inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A recognized server message.
    Message(ServerMessage),
    /// Well-formed envelope with a `kind` this client does not know.
    Unknown(String),
}

/// Envelope header used to tell unknown kinds from malformed frames.
#[derive(Deserialize)]
struct KindHeader {
    kind: String,
}

/// Decodes one inbound text frame.
///
/// # Errors
///
/// Returns [`Error::Deserialization`](crate::Error::Deserialization) if the
/// frame is not valid JSON, or if it carries a known `kind` with a malformed
/// payload.
pub fn decode(text: &str) -> Result<Inbound> {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(message) => Ok(Inbound::Message(message)),
        Err(err) => match serde_json::from_str::<KindHeader>(text) {
            Ok(header) if !KNOWN_KINDS.contains(&header.kind.as_str()) => {
                Ok(Inbound::Unknown(header.kind))
            }
            _ => Err(err.into()),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
