//! Chess Link - client-side session protocol for real-time two-player chess.
//!
//! This library connects a player to a game server, pairs players through
//! a matchmaking service, and queries a move-suggestion engine.
//!
//! # Architecture
//!
//! Three independent components, none of them tied to a UI:
//!
//! - **Session transport**: one WebSocket per game, `Auth` handshake,
//!   typed events, closure classification, bounded reconnection
//! - **Matchmaking**: single-flight pairing request with cancellation and
//!   a hard timeout
//! - **Engine**: idempotent `GET`s retried with exponential backoff
//!
//! Matchmaking yields a `(game_id, side)` pair that is handed to the
//! session transport to open the live game.
//!
//! # Quick Start
//!
//! ```no_run
//! use chess_link::{Client, Result, SessionEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder().build()?;
//!
//!     // Pair with an opponent, then join the assigned game
//!     let matchmaking = client.matchmaking();
//!     let (found, session, mut events) = client.find_and_connect(&matchmaking, "alice").await?;
//!     println!("playing {} as {}", found.game_id, found.side);
//!
//!     while let Some(event) = events.next().await {
//!         match event {
//!             SessionEvent::Authenticated => {
//!                 session.send_move("e4");
//!             }
//!             SessionEvent::Move(mv) => println!("move: {mv}"),
//!             SessionEvent::GameEnd(outcome) => {
//!                 println!("game over: {outcome:?}");
//!                 session.disconnect();
//!             }
//!             SessionEvent::Closed(closure) => println!("{closure}"),
//!             other => println!("{other:?}"),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`] factory and [`ClientBuilder`] configuration |
//! | [`transport`] | [`GameSession`], events, reconnection |
//! | [`matchmaking`] | [`MatchmakingClient`] |
//! | [`engine`] | [`EngineClient`], [`fetch_with_retry`] |
//! | [`protocol`] | Wire message types |
//! | [`backoff`] | Delay shapes for reconnects and retries |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`error`] | Error types and [`Result`] alias |

// ============================================================================
// Modules
// ============================================================================

/// Delay shapes shared by reconnection and retries.
pub mod backoff;

/// Client factory and configuration.
///
/// Use [`Client::builder()`] to create a configured client.
pub mod client;

/// Move-suggestion engine queries.
pub mod engine;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing game and user IDs at compile time.
pub mod identifiers;

/// Opponent pairing.
pub mod matchmaking;

/// Game server wire protocol.
pub mod protocol;

/// Game session transport.
pub mod transport;

mod endpoint;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ClientBuilder};

// Session types
pub use transport::{
    Closure, ClosureKind, GameSession, PreAuthPolicy, ReconnectPolicy, SessionEvent,
    SessionEvents, SessionOptions, SessionState,
};

// Matchmaking types
pub use matchmaking::{MatchFound, MatchmakingClient};

// Engine types
pub use engine::{BestMove, EngineClient, EngineSelfTest, EngineStatus, RetryPolicy, fetch_with_retry};

// Protocol types
pub use protocol::{ClientMessage, Outcome, ServerMessage, Side};

// Error types
pub use error::{CancelReason, Error, Result};

// Identifier types
pub use identifiers::{GameId, MatchRequestId, UserId};

// Shared
pub use backoff::Backoff;
