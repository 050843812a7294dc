//! Closure classification.
//!
//! Labels a connection close as expected ("normal") or unexpected
//! ("error"). A closure is normal when the close code is one of
//! 1000, 1001 or 1005, or when the reason text contains `game` or
//! `complete`. The text match is case-sensitive and heuristic; the
//! server gives no stronger guarantee.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio_tungstenite::tungstenite::protocol::CloseFrame;

// ============================================================================
// Constants
// ============================================================================

/// Reason reported when the server supplied none.
pub const DEFAULT_CLOSE_REASON: &str = "Game session ended";

/// Close codes that always count as normal.
const NORMAL_CODES: [u16; 3] = [1000, 1001, 1005];

/// Reason fragments that mark a close as normal.
const NORMAL_REASON_MARKERS: [&str; 2] = ["game", "complete"];

/// Code used when the peer sent a close frame without a status.
pub(crate) const NO_STATUS_CODE: u16 = 1005;

/// Code used when the connection dropped without a close frame.
pub(crate) const ABNORMAL_CODE: u16 = 1006;

// ============================================================================
// ClosureKind
// ============================================================================

/// Classification of a closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureKind {
    /// Expected end of the session.
    Normal,
    /// Unexpected loss of the connection.
    Error,
}

impl ClosureKind {
    /// Returns the label used in the display form.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Error => "error",
        }
    }
}

// ============================================================================
// Closure
// ============================================================================

/// A classified connection closure.
///
/// Displays as `disconnect:normal:<reason>` or `disconnect:error:<reason>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    /// WebSocket close code.
    pub code: u16,
    /// Reason text, or [`DEFAULT_CLOSE_REASON`].
    pub reason: String,
    /// Normal or error.
    pub kind: ClosureKind,
}

impl Closure {
    /// Classifies a closure from its code and optional reason.
    #[must_use]
    pub fn classify(code: u16, reason: Option<&str>) -> Self {
        let reason = reason.filter(|r| !r.is_empty());

        let normal = NORMAL_CODES.contains(&code)
            || reason.is_some_and(|r| NORMAL_REASON_MARKERS.iter().any(|m| r.contains(m)));

        Self {
            code,
            reason: reason.unwrap_or(DEFAULT_CLOSE_REASON).to_string(),
            kind: if normal {
                ClosureKind::Normal
            } else {
                ClosureKind::Error
            },
        }
    }

    /// Classifies a received close frame.
    pub(crate) fn from_frame(frame: Option<&CloseFrame>) -> Self {
        match frame {
            Some(frame) => Self::classify(u16::from(frame.code), Some(frame.reason.as_str())),
            None => Self::classify(NO_STATUS_CODE, None),
        }
    }

    /// Closure for a connection that dropped or never opened.
    pub(crate) fn abnormal() -> Self {
        Self::classify(ABNORMAL_CODE, None)
    }

    /// Returns `true` if the closure is classified normal.
    #[inline]
    #[must_use]
    pub fn is_normal(&self) -> bool {
        self.kind == ClosureKind::Normal
    }
}

impl fmt::Display for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "disconnect:{}:{}", self.kind.as_str(), self.reason)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    #[test]
    fn test_normal_code_without_reason() {
        let closure = Closure::classify(1000, None);
        assert_eq!(closure.to_string(), "disconnect:normal:Game session ended");
    }

    #[test]
    fn test_abnormal_code_with_reason() {
        let closure = Closure::classify(1006, Some("boom"));
        assert_eq!(closure.to_string(), "disconnect:error:boom");
    }

    #[test]
    fn test_reason_markers() {
        assert!(Closure::classify(4000, Some("game over")).is_normal());
        assert!(Closure::classify(1011, Some("match complete")).is_normal());
        assert!(!Closure::classify(1011, Some("Game over")).is_normal());
    }

    #[test]
    fn test_empty_reason_uses_placeholder() {
        let closure = Closure::classify(1011, Some(""));
        assert_eq!(closure.reason, DEFAULT_CLOSE_REASON);
        assert!(!closure.is_normal());
    }

    #[test]
    fn test_from_frame() {
        let frame = CloseFrame {
            code: CloseCode::Away,
            reason: String::from("bye").into(),
        };
        let closure = Closure::from_frame(Some(&frame));
        assert_eq!(closure.code, 1001);
        assert_eq!(closure.to_string(), "disconnect:normal:bye");

        let closure = Closure::from_frame(None);
        assert_eq!(closure.code, NO_STATUS_CODE);
        assert!(closure.is_normal());
    }

    #[test]
    fn test_abnormal() {
        let closure = Closure::abnormal();
        assert_eq!(closure.code, ABNORMAL_CODE);
        assert_eq!(closure.to_string(), "disconnect:error:Game session ended");
    }

    proptest! {
        #[test]
        fn prop_normal_codes_ignore_reason(code in prop::sample::select(vec![1000u16, 1001, 1005]), reason in ".*") {
            prop_assert!(Closure::classify(code, Some(&reason)).is_normal());
        }

        #[test]
        fn prop_other_codes_follow_reason(code in 1002u16..5000, reason in "[A-Z ]{0,20}") {
            prop_assume!(code != 1005);
            // Upper-case text never contains the lower-case markers.
            prop_assert!(!Closure::classify(code, Some(&reason)).is_normal());
        }
    }
}
