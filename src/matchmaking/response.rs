//! Matchmaking wire types.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifiers::{GameId, UserId};
use crate::protocol::Side;

// ============================================================================
// Request
// ============================================================================

/// Body of `POST /match`.
#[derive(Debug, Serialize)]
pub(crate) struct MatchRequestBody<'a> {
    pub(crate) user_id: &'a UserId,
}

// ============================================================================
// Response
// ============================================================================

/// Result union returned by the matchmaking service.
///
/// `{"result":"Ok","value":{"game_id":"g1","color":"Black"}}` or
/// `{"result":"Err","value":"message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "result", content = "value")]
pub(crate) enum MatchResponse {
    Ok(MatchAssignment),
    Err(String),
}

/// Payload of a successful pairing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct MatchAssignment {
    pub(crate) game_id: GameId,
    pub(crate) color: Side,
}

// ============================================================================
// MatchFound
// ============================================================================

/// A successful pairing: the game to join and the side assigned to us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFound {
    /// Game to open a session for.
    pub game_id: GameId,
    /// Side assigned to the requesting player.
    pub side: Side,
}

impl From<MatchAssignment> for MatchFound {
    fn from(assignment: MatchAssignment) -> Self {
        Self {
            game_id: assignment.game_id,
            side: assignment.color,
        }
    }
}

impl fmt::Display for MatchFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as {}", self.game_id, self.side)
    }
}

// ============================================================================
// Tests
// ============================================================================
