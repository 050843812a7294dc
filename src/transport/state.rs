//! Observable session state.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// ============================================================================
// SessionState
// ============================================================================

/// Lifecycle of one game connection.
///
/// `Connecting → Authenticated → Closed`, or `Connecting → Closed`.
/// Nothing leaves `Closed`; a reconnect starts a fresh connection at
/// `Connecting`, and after a local disconnect `Closed` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Socket created, `Auth` sent, waiting for `AuthSuccess`.
    Connecting,
    /// Server accepted the handshake.
    Authenticated,
    /// Connection gone.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

// ============================================================================
// StateCell
// ============================================================================

/// Shared state slot for a session handle and its background task.
///
/// Once the shutdown token is cancelled only `Closed` can be stored, so a
/// background transition racing a local disconnect cannot reopen the state.
#[derive(Clone)]
pub(crate) struct StateCell {
    tx: Arc<watch::Sender<SessionState>>,
    shutdown: CancellationToken,
}

impl StateCell {
    /// Creates a cell in `Connecting`.
    pub(crate) fn new(shutdown: CancellationToken) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Connecting);
        Self {
            tx: Arc::new(tx),
            shutdown,
        }
    }

    /// Stores `next`; returns `true` if the state changed.
    pub(crate) fn set(&self, next: SessionState) -> bool {
        let shutdown = &self.shutdown;
        let changed = self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if shutdown.is_cancelled() && next != SessionState::Closed {
                return false;
            }
            *current = next;
            true
        });

        if changed {
            debug!(state = %next, "Session state changed");
        }
        changed
    }

    /// Returns the current state.
    pub(crate) fn get(&self) -> SessionState {
        *self.tx.borrow()
    }

    /// Returns a receiver notified on every change.
    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

// ============================================================================
// Tests
// ============================================================================
