//! Game-level payload types carried inside protocol messages.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Side
// ============================================================================

/// The side a player controls.
///
/// Serialized as `"White"` / `"Black"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Moves first.
    #[serde(alias = "w")]
    White,
    /// Moves second.
    #[serde(alias = "b")]
    Black,
}

impl Side {
    /// Returns the single-letter code used by board libraries (`'w'` / `'b'`).
    #[inline]
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Returns the other side.
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => f.write_str("White"),
            Self::Black => f.write_str("Black"),
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Final result of a game.
///
/// An ongoing game has no outcome; it is only reported through `GameEnd`.
///
/// # Format
///
/// ```json
/// {"Decisive": {"winner": "White"}}
/// "Draw"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// One side won.
    Decisive {
        /// Winning side.
        winner: Side,
    },
    /// Nobody won.
    Draw,
}

impl Outcome {
    /// Returns the winner, or `None` for a draw.
    #[inline]
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        match self {
            Self::Decisive { winner } => Some(*winner),
            Self::Draw => None,
        }
    }

    /// Returns `true` for a draw.
    #[inline]
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        matches!(self, Self::Draw)
    }
}

// ============================================================================
// ServerErrorKind / ServerErrorValue
// ============================================================================

/// Error codes the game server reports.
///
/// Both vocabularies in circulation are accepted: `FailedAuth` and
/// `NotYourTurn` are aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerErrorKind {
    /// Server could not parse a client message.
    Deserialization,
    /// Credentials rejected.
    #[serde(alias = "FailedAuth")]
    Unauthorized,
    /// Move sent out of turn.
    #[serde(alias = "NotYourTurn")]
    InvalidTurn,
    /// Illegal move.
    InvalidMove,
}

/// Payload of a server `Error` message: a known code or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerErrorValue {
    /// Recognized error code.
    Kind(ServerErrorKind),
    /// Anything else the server sent.
    Text(String),
}

impl From<ServerErrorValue> for Error {
    fn from(value: ServerErrorValue) -> Self {
        match value {
            ServerErrorValue::Kind(ServerErrorKind::Deserialization) => {
                Error::deserialization("server could not decode client message")
            }
            ServerErrorValue::Kind(ServerErrorKind::Unauthorized) => Error::Unauthorized,
            ServerErrorValue::Kind(ServerErrorKind::InvalidTurn) => Error::InvalidTurn,
            ServerErrorValue::Kind(ServerErrorKind::InvalidMove) => Error::InvalidMove,
            ServerErrorValue::Text(message) => Error::remote(message),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_codes() {
        assert_eq!(Side::White.as_char(), 'w');
        assert_eq!(Side::Black.as_char(), 'b');
        assert_eq!(Side::White.opponent(), Side::Black);
    }

    #[test]
    fn test_outcome_decisive() {
        let outcome: Outcome =
            serde_json::from_str(r#"{"Decisive":{"winner":"Black"}}"#).expect("parse");
        assert_eq!(outcome.winner(), Some(Side::Black));
        assert!(!outcome.is_draw());
    }

    #[test]
    fn test_outcome_draw() {
        let outcome: Outcome = serde_json::from_str(r#""Draw""#).expect("parse");
        assert!(outcome.is_draw());
        assert_eq!(outcome.winner(), None);
    }

    #[test]
    fn test_error_value_aliases() {
        let value: ServerErrorValue = serde_json::from_str(r#""NotYourTurn""#).expect("parse");
        assert_eq!(value, ServerErrorValue::Kind(ServerErrorKind::InvalidTurn));

        let value: ServerErrorValue = serde_json::from_str(r#""FailedAuth""#).expect("parse");
        assert!(matches!(Error::from(value), Error::Unauthorized));
    }

    #[test]
    fn test_error_value_free_text() {
        let value: ServerErrorValue =
            serde_json::from_str(r#""Game not found""#).expect("parse");
        let err = Error::from(value);
        assert_eq!(err.to_string(), "Server error: Game not found");
    }
}
