//! Engine service response bodies.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Greeting or health text.
    pub message: String,
}

/// Body of `GET /test`: result of a round trip to the engine process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSelfTest {
    /// Short status word reported by the service.
    pub status: String,
    /// Human-readable summary.
    pub message: String,
    /// Raw engine output.
    pub response: String,
}

/// Body of `GET /bestmove?fen=...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestMove {
    /// Suggested move in coordinate notation, e.g. `e2e4`.
    pub best_move: String,
    /// Position after the move is played.
    pub new_fen: String,
}

/// Raw body of `GET /bestmove`.
///
/// The engine answers `200` either way; a position it cannot solve comes
/// back as `{"status":"error","message":...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BestMoveReply {
    Move(BestMove),
    Refused { status: String, message: String },
}

impl BestMoveReply {
    /// Maps a refusal to [`Error::Remote`] carrying the engine's message.
    pub(crate) fn into_result(self) -> Result<BestMove> {
        match self {
            Self::Move(best) => Ok(best),
            Self::Refused { status, message } => {
                if message.trim().is_empty() {
                    Err(Error::remote(status))
                } else {
                    Err(Error::remote(message))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_move_reply_suggestion() {
        let reply: BestMoveReply =
            serde_json::from_str(r#"{"best_move":"g1f3","new_fen":"after"}"#).expect("parse");
        let best = reply.into_result().expect("suggestion");
        assert_eq!(best.best_move, "g1f3");
    }

    #[test]
    fn test_best_move_reply_refusal() {
        let reply: BestMoveReply = serde_json::from_str(
            r#"{"status":"error","message":"Could not parse best move from engine output"}"#,
        )
        .expect("parse");

        let err = reply.into_result().unwrap_err();
        assert!(
            matches!(err, Error::Remote { ref message } if message == "Could not parse best move from engine output")
        );
    }

    #[test]
    fn test_best_move_reply_rejects_other_shapes() {
        assert!(serde_json::from_str::<BestMoveReply>(r#"{"best_move":"e2e4"}"#).is_err());
    }
}
