//! Session events delivered to the consumer.
//!
//! A session has exactly one event stream, handed out when it is opened.
//! Events arrive in the order the server sent the underlying frames.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use tracing::trace;

use crate::error::Error;
use crate::protocol::Outcome;

use super::closure::Closure;

// ============================================================================
// SessionEvent
// ============================================================================

/// Something that happened on a game session.
#[derive(Debug)]
pub enum SessionEvent {
    /// Server accepted the handshake. Emitted once per connection.
    Authenticated,
    /// A move was played.
    Move(String),
    /// Full move list, typically right after authentication.
    MoveHistory(Vec<String>),
    /// Game finished.
    GameEnd(Outcome),
    /// Server-reported error, undecodable frame, or exhausted reconnect budget.
    Error(Error),
    /// Connection closed by the network or the server.
    Closed(Closure),
}

// ============================================================================
// SessionEvents
// ============================================================================

/// Receiving end of a session's event stream.
///
/// The stream ends (`next` returns `None`) when the session can no longer
/// produce events: after a local disconnect, a normal closure, a closure
/// with reconnection disabled, or an exhausted reconnect budget.
#[derive(Debug)]
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionEvents {
    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<SessionEvent> {
        self.rx.try_recv().ok()
    }
}

// ============================================================================
// EventSink
// ============================================================================

/// Sending end held by the session task.
#[derive(Clone)]
pub(crate) struct EventSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    /// Emits an event; a dropped receiver is not an error.
    pub(crate) fn emit(&self, event: SessionEvent) {
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            trace!(?event, "Event receiver dropped");
        }
    }
}

/// Creates a connected sink/stream pair.
pub(crate) fn channel() -> (EventSink, SessionEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink { tx }, SessionEvents { rx })
}

// ============================================================================
// Tests
// ============================================================================
