//! Move-suggestion engine queries with retry.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RetryPolicy`] | Attempt budget and exponential backoff |
//! | [`fetch_with_retry`] | Retry a `GET` until success or exhaustion |
//! | [`EngineClient`] | Typed `status`, `self_test` and `best_move` queries |

// ============================================================================
// Submodules
// ============================================================================

/// Engine client.
pub mod client;

/// Retry policy and retried fetch.
pub mod retry;

/// Response bodies.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::EngineClient;
pub use retry::{RetryPolicy, fetch_with_retry};
pub use types::{BestMove, EngineSelfTest, EngineStatus};
