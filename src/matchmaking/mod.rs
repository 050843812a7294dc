//! Opponent pairing.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MatchmakingClient`] | Single-flight, cancelable, timeout-bounded pairing |
//! | [`MatchFound`] | Assigned game and side |
//!
//! # Wire Contract
//!
//! ```text
//! POST {endpoint}/match        {"user_id": "alice"}
//!
//! 200 {"result":"Ok","value":{"game_id":"g1","color":"Black"}}   → MatchFound
//! 200 {"result":"Err","value":"no players"}                      → Error::MatchFailed
//! non-2xx                                                         → Error::ServerError
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Matchmaking client.
pub mod client;

/// Wire types.
pub mod response;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{DEFAULT_MATCH_TIMEOUT, MatchmakingClient};
pub use response::MatchFound;
