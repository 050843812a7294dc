//! Game server wire protocol.
//!
//! This module defines the JSON messages exchanged over the game
//! connection. There is no version field; new server behaviour only adds
//! new `kind` values, which this client ignores.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `ClientMessage::Auth` | Local → Remote | Join a game, first frame on every connection |
//! | `ClientMessage::Move` | Local → Remote | Relay a move |
//! | `ServerMessage` | Remote → Local | Moves, history, game end, errors, auth acknowledgement |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `game` | Sides, outcomes and server error codes |
//! | `message` | Message envelopes and frame decoding |

// ============================================================================
// Submodules
// ============================================================================

/// Sides, outcomes and server error codes.
pub mod game;

/// Message envelopes and frame decoding.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use game::{Outcome, ServerErrorKind, ServerErrorValue, Side};
pub use message::{ClientMessage, Inbound, ServerMessage, decode};
