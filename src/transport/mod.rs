//! WebSocket transport layer.
//!
//! This module owns the live game connection: socket handshake, inbound
//! dispatch, closure classification, and reconnection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  GameSession    │                              │  Game server    │
//! │  (handle)       │         WebSocket            │                 │
//! │    │            │◄────────────────────────────►│  /ws            │
//! │    ▼            │   Auth, Move ─►  ◄─ events   │                 │
//! │  Supervisor     │                              │                 │
//! │  → event loop   │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `GameSession::open` - Connect and send `Auth`
//! 2. `Dispatcher` - Turn frames into [`SessionEvent`]s, detect `AuthSuccess`
//! 3. [`Closure`] - Classify how the socket ended
//! 4. Reconnect per [`ReconnectPolicy`] after abnormal closures
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `closure` | Closure classification |
//! | `connection` | Socket handshake and event loop |
//! | `dispatch` | Inbound frame dispatch |
//! | `event` | Consumer-facing event stream |
//! | `options` | Reconnect and pre-auth policy |
//! | `session` | Session handle and reconnection supervisor |
//! | `state` | Observable session state |

// ============================================================================
// Submodules
// ============================================================================

/// Closure classification.
pub mod closure;

mod connection;
mod dispatch;

/// Session events.
pub mod event;

/// Session options.
pub mod options;

/// Session handle and reconnection supervisor.
pub mod session;

/// Observable session state.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use closure::{Closure, ClosureKind, DEFAULT_CLOSE_REASON};
pub use event::{SessionEvent, SessionEvents};
pub use options::{PreAuthPolicy, ReconnectPolicy, SessionOptions};
pub use session::GameSession;
pub use state::SessionState;
