//! Game session handle and reconnection supervisor.
//!
//! A [`GameSession`] owns one logical game connection and its reconnection
//! lineage. The socket itself lives in a background task; the handle relays
//! moves into it, observes its state, and can shut it down.
//!
//! # Lifecycle
//!
//! 1. `GameSession::open` - Validate inputs, connect, send `Auth`
//! 2. Background task dispatches frames until the socket closes
//! 3. On abnormal closure, reconnect per [`ReconnectPolicy`]
//! 4. `GameSession::disconnect` - Close with code 1000, suppress reconnects
//!
//! Dropping the last handle behaves like `disconnect`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::endpoint;
use crate::error::{Error, Result};
use crate::identifiers::{GameId, UserId};
use crate::protocol::ClientMessage;

use super::closure::Closure;
use super::connection::{self, ConnectionEnd, OutboundRx, WsStream};
use super::dispatch::Dispatcher;
use super::event::{self, EventSink, SessionEvent, SessionEvents};
use super::options::SessionOptions;
use super::state::{SessionState, StateCell};

// ============================================================================
// Types
// ============================================================================

/// Sender into the live connection, `None` between connections.
type OutboundSlot = Arc<Mutex<Option<mpsc::UnboundedSender<ClientMessage>>>>;

/// Shared handle state.
struct SessionInner {
    game_id: GameId,
    user_id: UserId,
    state: StateCell,
    outbound: OutboundSlot,
    shutdown: CancellationToken,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        // Last handle gone: stop the background task.
        self.shutdown.cancel();
    }
}

// ============================================================================
// GameSession
// ============================================================================

/// Handle to one live game session.
///
/// Cloning yields another handle to the same session.
///
/// # Example
///
/// ```no_run
/// use chess_link::{GameSession, SessionEvent, SessionOptions};
///
/// # async fn example() -> chess_link::Result<()> {
/// let (session, mut events) =
///     GameSession::open("ws://localhost:8000/ws", "g1", "alice", SessionOptions::new()).await?;
///
/// while let Some(event) = events.next().await {
///     match event {
///         SessionEvent::Authenticated => {
///             session.send_move("e4");
///         }
///         SessionEvent::Move(mv) => println!("opponent played {mv}"),
///         SessionEvent::GameEnd(outcome) => {
///             println!("game over: {outcome:?}");
///             session.disconnect();
///         }
///         other => println!("{other:?}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GameSession {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("game_id", &self.inner.game_id)
            .field("user_id", &self.inner.user_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// GameSession - Public API
// ============================================================================

impl GameSession {
    /// Opens a game connection and sends the `Auth` handshake.
    ///
    /// Returns the handle together with the session's only event stream.
    /// A failed initial connect is returned here and not retried;
    /// reconnection only applies to connections that were established.
    ///
    /// # Arguments
    ///
    /// * `url` - Game server endpoint (`ws://` or `wss://`)
    /// * `game_id` - Game to join
    /// * `user_id` - Joining player
    /// * `options` - Reconnection and pre-authentication policy
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the URL is malformed or an identifier is blank
    /// - [`Error::Connection`] if the socket cannot be opened
    /// - [`Error::WebSocket`] if the `Auth` frame cannot be sent
    pub async fn open(
        url: &str,
        game_id: impl Into<String>,
        user_id: impl Into<String>,
        options: SessionOptions,
    ) -> Result<(Self, SessionEvents)> {
        let url = parse_game_url(url)?;
        let game_id = GameId::new(game_id)?;
        let user_id = UserId::new(user_id)?;

        info!(%url, %game_id, %user_id, "Opening game session");

        let hello = ClientMessage::auth(game_id.clone(), user_id.clone());
        let ws_stream = connection::connect(&url, &hello).await?;

        let shutdown = CancellationToken::new();
        let state = StateCell::new(shutdown.clone());
        let (events_tx, events) = event::channel();

        // Install the first sender before spawning; `send_move` still waits
        // for `Authenticated`.
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let outbound: OutboundSlot = Arc::new(Mutex::new(Some(outbound_tx)));

        let supervisor = Supervisor {
            url,
            hello,
            game_id: game_id.clone(),
            options,
            state: state.clone(),
            events: events_tx,
            outbound: Arc::clone(&outbound),
            shutdown: shutdown.clone(),
        };
        tokio::spawn(supervisor.run(ws_stream, outbound_rx));

        let session = Self {
            inner: Arc::new(SessionInner {
                game_id,
                user_id,
                state,
                outbound,
                shutdown,
            }),
        };

        Ok((session, events))
    }

    /// Relays a move to the server.
    ///
    /// Does not check turn order or legality. Returns `false`, without
    /// error, unless the current connection is authenticated.
    pub fn send_move(&self, mv: impl Into<String>) -> bool {
        let mv = mv.into();

        let state = self.state();
        if state != SessionState::Authenticated {
            debug!(%mv, ?state, "Not authenticated, move not sent");
            return false;
        }

        let slot = self.inner.outbound.lock();

        match slot.as_ref() {
            Some(tx) => {
                debug!(%mv, "Sending move");
                tx.send(ClientMessage::play(mv)).is_ok()
            }
            None => {
                debug!(%mv, "No live connection, move not sent");
                false
            }
        }
    }

    /// Closes the connection and suppresses any pending or future reconnect.
    ///
    /// Idempotent. The state becomes `Closed` before this returns.
    pub fn disconnect(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }

        info!(game_id = %self.inner.game_id, "Disconnecting session");
        self.inner.shutdown.cancel();
        self.inner.outbound.lock().take();
        self.inner.state.set(SessionState::Closed);
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.get()
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Returns `true` if the connection is open and authenticated.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Returns the game this session joined.
    #[inline]
    #[must_use]
    pub fn game_id(&self) -> &GameId {
        &self.inner.game_id
    }

    /// Returns the local player.
    #[inline]
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.inner.user_id
    }
}

/// Parses a game endpoint, requiring a WebSocket scheme.
fn parse_game_url(url: &str) -> Result<Url> {
    endpoint::parse(url, endpoint::WS_SCHEMES).map_err(Error::invalid_argument)
}

// ============================================================================
// Supervisor
// ============================================================================

/// Background task owning the connection lineage.
struct Supervisor {
    url: Url,
    hello: ClientMessage,
    game_id: GameId,
    options: SessionOptions,
    state: StateCell,
    events: EventSink,
    outbound: OutboundSlot,
    shutdown: CancellationToken,
}

impl Supervisor {
    /// Runs connections until the lineage ends.
    async fn run(self, ws_stream: WsStream, outbound_rx: OutboundRx) {
        let mut attempt: u32 = 0;
        let mut current = (ws_stream, outbound_rx);

        loop {
            let (ws_stream, outbound_rx) = current;
            let dispatcher = Dispatcher::new(
                self.state.clone(),
                self.events.clone(),
                self.options.pre_auth,
            );

            let end =
                connection::run_event_loop(ws_stream, dispatcher, outbound_rx, self.shutdown.clone())
                    .await;

            self.outbound.lock().take();
            self.state.set(SessionState::Closed);

            let Some(closure) = self.closure_to_report(end, &mut attempt) else {
                info!(game_id = %self.game_id, "Session closed");
                return;
            };

            self.report(closure.clone());

            if closure.is_normal() || !self.options.reconnect.is_enabled() {
                info!(game_id = %self.game_id, %closure, "Session ended");
                return;
            }

            match self.reconnect(&mut attempt).await {
                Some(next) => current = next,
                None => return,
            }
        }
    }

    /// Returns the closure to report for a finished connection.
    ///
    /// `None` after local shutdown, including when the server's close frame
    /// won the race against `disconnect`.
    fn closure_to_report(&self, end: ConnectionEnd, attempt: &mut u32) -> Option<Closure> {
        match end {
            ConnectionEnd::Local => None,
            ConnectionEnd::Remote { .. } if self.shutdown.is_cancelled() => None,
            ConnectionEnd::Remote {
                closure,
                authenticated,
            } => {
                if authenticated {
                    *attempt = 0;
                }
                Some(closure)
            }
        }
    }

    /// Retries until a socket opens, the budget runs out, or shutdown.
    async fn reconnect(&self, attempt: &mut u32) -> Option<(WsStream, OutboundRx)> {
        let policy = self.options.reconnect;

        loop {
            if *attempt >= policy.max_attempts() {
                error!(
                    game_id = %self.game_id,
                    attempts = *attempt,
                    "Maximum reconnection attempts reached"
                );
                self.events
                    .emit(SessionEvent::Error(Error::connection_lost(*attempt)));
                return None;
            }

            *attempt += 1;
            let delay = policy.delay_for(*attempt);
            info!(
                attempt = *attempt,
                max = policy.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                "Scheduling reconnect"
            );

            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => return None,
                () = sleep(delay) => {}
            }

            self.state.set(SessionState::Connecting);

            let result = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => return None,
                result = connection::connect(&self.url, &self.hello) => result,
            };

            match result {
                Ok(ws_stream) => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    *self.outbound.lock() = Some(tx);
                    info!(attempt = *attempt, "Reconnected");
                    return Some((ws_stream, rx));
                }
                Err(e) => {
                    warn!(attempt = *attempt, error = %e, "Reconnect attempt failed");
                    self.state.set(SessionState::Closed);
                    if self.shutdown.is_cancelled() {
                        return None;
                    }
                    self.report(Closure::abnormal());
                }
            }
        }
    }

    /// Emits the single notification that follows every closure.
    fn report(&self, closure: Closure) {
        if closure.is_normal() {
            info!(code = closure.code, %closure, "Connection closed");
        } else {
            warn!(code = closure.code, %closure, "Connection lost");
        }
        self.events.emit(SessionEvent::Closed(closure));
    }
}

// ============================================================================
// Tests
// ============================================================================
