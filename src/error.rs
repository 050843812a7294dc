//! Error types for chess-link.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use chess_link::{Error, Result};
//!
//! async fn example(matchmaking: &MatchmakingClient) -> Result<()> {
//!     match matchmaking.find_match("alice").await {
//!         Ok(found) => println!("playing {} in {}", found.side, found.game_id),
//!         Err(Error::Cancelled { reason }) => println!("stopped: {reason}"),
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionLost`] |
//! | Game rules (server-reported) | [`Error::Unauthorized`], [`Error::InvalidTurn`], [`Error::InvalidMove`], [`Error::Remote`] |
//! | Matchmaking | [`Error::AlreadyInProgress`], [`Error::Cancelled`], [`Error::ServerError`], [`Error::MatchFailed`] |
//! | Engine | [`Error::RequestFailed`] |
//! | Decoding | [`Error::Deserialization`] |
//! | External | [`Error::Http`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// CancelReason
// ============================================================================

/// Why a matchmaking request was cancelled.
///
/// Timeout and operator cancellation abort the same signal; this field lets
/// callers tell them apart without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// [`cancel_match`](crate::MatchmakingClient::cancel_match) was called.
    Requested,
    /// The matchmaking timeout elapsed.
    TimedOut,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("match finding was canceled"),
            Self::TimedOut => f.write_str("match finding timed out"),
        }
    }
}

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument passed to an operation.
    ///
    /// Returned for blank identifiers and malformed inputs, before any I/O.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Game connection could not be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Reconnection budget exhausted.
    ///
    /// Emitted once, after the last reconnect attempt fails.
    #[error("Connection lost after {attempts} reconnect attempts")]
    ConnectionLost {
        /// Number of reconnect attempts made.
        attempts: u32,
    },

    // ========================================================================
    // Server-Reported Errors
    // ========================================================================
    /// Frame or body could not be decoded.
    ///
    /// Also used when the server reports that it could not decode ours.
    #[error("Deserialization error: {message}")]
    Deserialization {
        /// Description of the decoding failure.
        message: String,
    },

    /// Server rejected the session credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Server rejected a move played out of turn.
    #[error("Invalid turn")]
    InvalidTurn,

    /// Server rejected an illegal move.
    #[error("Invalid move")]
    InvalidMove,

    /// Free-form error text sent by the game server or the engine.
    #[error("Server error: {message}")]
    Remote {
        /// Message as sent by the remote side.
        message: String,
    },

    // ========================================================================
    // Matchmaking Errors
    // ========================================================================
    /// A matchmaking request is already active on this client.
    #[error("Matching is already in progress")]
    AlreadyInProgress,

    /// Matchmaking request was cancelled or timed out.
    #[error("Cancelled: {reason}")]
    Cancelled {
        /// What aborted the request.
        reason: CancelReason,
    },

    /// Matchmaking endpoint answered with a non-success status.
    #[error("Matchmaking server error: {detail}")]
    ServerError {
        /// Response body, or the status code when the body is empty.
        detail: String,
    },

    /// Matchmaking endpoint answered with an `Err` result.
    #[error("Failed to find match: {message}")]
    MatchFailed {
        /// Message carried by the `Err` result.
        message: String,
    },

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// Request kept failing until the retry budget ran out.
    #[error("Request failed: {status}")]
    RequestFailed {
        /// HTTP status of the last attempt.
        status: u16,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::deserialization(err.to_string())
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection lost error.
    #[inline]
    pub fn connection_lost(attempts: u32) -> Self {
        Self::ConnectionLost { attempts }
    }

    /// Creates a deserialization error.
    #[inline]
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }

    /// Creates a free-form server error.
    #[inline]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Creates a cancellation error.
    #[inline]
    pub fn cancelled(reason: CancelReason) -> Self {
        Self::Cancelled { reason }
    }

    /// Creates a matchmaking server error.
    #[inline]
    pub fn server_error(detail: impl Into<String>) -> Self {
        Self::ServerError {
            detail: detail.into(),
        }
    }

    /// Creates a match failed error.
    #[inline]
    pub fn match_failed(message: impl Into<String>) -> Self {
        Self::MatchFailed {
            message: message.into(),
        }
    }

    /// Creates a request failed error.
    #[inline]
    pub fn request_failed(status: u16) -> Self {
        Self::RequestFailed { status }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a cancellation (operator or timeout).
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns `true` if this is a timeout-driven cancellation.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Cancelled {
                reason: CancelReason::TimedOut
            }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionLost { .. } | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the server rejected a game action.
    #[inline]
    #[must_use]
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::InvalidTurn | Self::InvalidMove
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionLost { .. }
                | Self::Cancelled { .. }
                | Self::ServerError { .. }
                | Self::RequestFailed { .. }
                | Self::Http(_)
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
