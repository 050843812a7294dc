//! Inbound frame dispatch for one connection.
//!
//! Turns text frames into [`SessionEvent`]s and drives the
//! `Connecting → Authenticated` transition. Nothing here can fail: decode
//! errors become `Error` events and unknown kinds are logged and skipped.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, trace, warn};

use crate::protocol::{Inbound, ServerMessage, decode};

use super::event::{EventSink, SessionEvent};
use super::options::PreAuthPolicy;
use super::state::{SessionState, StateCell};

// ============================================================================
// Dispatcher
// ============================================================================

/// Per-connection dispatcher. A reconnect gets a fresh one.
pub(crate) struct Dispatcher {
    state: StateCell,
    events: EventSink,
    pre_auth: PreAuthPolicy,
    /// Game events held back until authentication.
    pending: Vec<SessionEvent>,
    authenticated: bool,
}

impl Dispatcher {
    pub(crate) fn new(state: StateCell, events: EventSink, pre_auth: PreAuthPolicy) -> Self {
        Self {
            state,
            events,
            pre_auth,
            pending: Vec::new(),
            authenticated: false,
        }
    }

    /// Returns `true` once this connection has seen `AuthSuccess`.
    #[inline]
    pub(crate) fn authenticated(&self) -> bool {
        self.authenticated
    }

    /// Handles one inbound text frame.
    pub(crate) fn dispatch(&mut self, text: &str) {
        match decode(text) {
            Ok(Inbound::Message(message)) => self.handle(message),
            Ok(Inbound::Unknown(kind)) => {
                warn!(%kind, "Ignoring message with unknown kind");
            }
            Err(e) => {
                warn!(error = %e, frame = %text, "Failed to parse server message");
                self.events.emit(SessionEvent::Error(e));
            }
        }
    }

    fn handle(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::AuthSuccess => self.on_auth_success(),
            ServerMessage::Pong => trace!("Pong"),
            ServerMessage::Move(mv) => self.game_event(SessionEvent::Move(mv)),
            ServerMessage::MoveHistory(moves) => self.game_event(SessionEvent::MoveHistory(moves)),
            ServerMessage::GameEnd(outcome) => {
                info!(?outcome, "Game ended");
                self.game_event(SessionEvent::GameEnd(outcome));
            }
            ServerMessage::Error(value) => {
                warn!(?value, "Server reported error");
                self.events.emit(SessionEvent::Error(value.into()));
            }
        }
    }

    fn on_auth_success(&mut self) {
        if self.authenticated {
            debug!("Duplicate AuthSuccess ignored");
            return;
        }

        self.authenticated = true;
        self.state.set(SessionState::Authenticated);
        info!("Authentication successful");
        self.events.emit(SessionEvent::Authenticated);

        for event in self.pending.drain(..) {
            self.events.emit(event);
        }
    }

    fn game_event(&mut self, event: SessionEvent) {
        if self.authenticated {
            self.events.emit(event);
            return;
        }

        match self.pre_auth {
            PreAuthPolicy::Deliver => self.events.emit(event),
            PreAuthPolicy::Buffer => {
                debug!(pending = self.pending.len() + 1, "Holding event until authenticated");
                self.pending.push(event);
            }
            PreAuthPolicy::Drop => debug!(?event, "Dropping event received before authentication"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
