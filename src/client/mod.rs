//! Client entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Factory for sessions, matchmaking and engine clients |
//! | [`ClientBuilder`] | Fluent configuration builder |
//!
//! # Defaults
//!
//! | Setting | Default | Environment |
//! |---------|---------|-------------|
//! | Game server | `ws://localhost:8000/ws` | `CHESS_WS_URL` |
//! | Matchmaking | `http://localhost:8001` | `CHESS_MATCHMAKING_URL` |
//! | Engine | `http://localhost:4000` | `CHESS_ENGINE_URL` |
//! | Match timeout | 15 s | |
//! | Reconnect | 3 attempts, 2 s × attempt | |
//! | Engine retry | 5 attempts, 1 s × 1.5ⁿ | |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for client configuration.
pub mod builder;

/// Core client implementation.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use core::Client;
