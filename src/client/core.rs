//! Client implementation.
//!
//! The [`Client`] holds validated endpoints and defaults, and hands out
//! the three components: game sessions, matchmaking, and engine queries.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use url::Url;

use crate::engine::{EngineClient, RetryPolicy};
use crate::error::Result;
use crate::matchmaking::{MatchFound, MatchmakingClient};
use crate::transport::{GameSession, SessionEvents, SessionOptions};

use super::builder::ClientBuilder;

// ============================================================================
// Types
// ============================================================================

/// Validated configuration produced by [`ClientBuilder::build`].
pub(crate) struct ClientInner {
    pub(crate) ws_url: Url,
    pub(crate) matchmaking_url: Url,
    pub(crate) engine_url: Url,
    pub(crate) session: SessionOptions,
    pub(crate) match_timeout: Duration,
    pub(crate) retry: RetryPolicy,
    pub(crate) http: reqwest::Client,
}

// ============================================================================
// Client
// ============================================================================

/// Entry point tying matchmaking, game sessions and engine queries to one
/// deployment.
///
/// Cheap to clone.
///
/// # Example
///
/// ```no_run
/// use chess_link::{Client, SessionEvent};
///
/// # async fn example() -> chess_link::Result<()> {
/// let client = Client::builder().build()?;
/// let matchmaking = client.matchmaking();
///
/// let (found, session, mut events) = client.find_and_connect(&matchmaking, "alice").await?;
/// println!("playing {} as {}", found.game_id, found.side);
///
/// while let Some(event) = events.next().await {
///     if let SessionEvent::GameEnd(outcome) = event {
///         println!("{outcome:?}");
///         session.disconnect();
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("ws_url", &self.inner.ws_url.as_str())
            .field("matchmaking_url", &self.inner.matchmaking_url.as_str())
            .field("engine_url", &self.inner.engine_url.as_str())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client - Public API
// ============================================================================

impl Client {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Opens a game session with the configured [`SessionOptions`].
    ///
    /// # Errors
    ///
    /// See [`GameSession::open`].
    pub async fn connect(
        &self,
        game_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<(GameSession, SessionEvents)> {
        self.connect_with(game_id, user_id, self.inner.session).await
    }

    /// Opens a game session with explicit options.
    ///
    /// # Errors
    ///
    /// See [`GameSession::open`].
    pub async fn connect_with(
        &self,
        game_id: impl Into<String>,
        user_id: impl Into<String>,
        options: SessionOptions,
    ) -> Result<(GameSession, SessionEvents)> {
        GameSession::open(self.inner.ws_url.as_str(), game_id, user_id, options).await
    }

    /// Creates a fresh matchmaking client with its own single-flight slot.
    #[must_use]
    pub fn matchmaking(&self) -> MatchmakingClient {
        MatchmakingClient::from_url(
            &self.inner.matchmaking_url,
            self.inner.http.clone(),
            self.inner.match_timeout,
        )
    }

    /// Creates an engine client.
    #[must_use]
    pub fn engine(&self) -> EngineClient {
        EngineClient::from_url(
            self.inner.engine_url.clone(),
            self.inner.http.clone(),
            self.inner.retry,
        )
    }

    /// Finds an opponent through `matchmaking`, then opens the assigned game.
    ///
    /// The matchmaking client is borrowed so another task can cancel the
    /// pairing through it.
    ///
    /// # Errors
    ///
    /// Any error of [`MatchmakingClient::find_match`] or [`GameSession::open`].
    pub async fn find_and_connect(
        &self,
        matchmaking: &MatchmakingClient,
        user_id: impl Into<String>,
    ) -> Result<(MatchFound, GameSession, SessionEvents)> {
        let user_id = user_id.into();
        let found = matchmaking.find_match(user_id.as_str()).await?;

        info!(game_id = %found.game_id, side = %found.side, "Joining matched game");
        let (session, events) = self.connect(found.game_id.as_str(), user_id).await?;

        Ok((found, session, events))
    }

    /// Returns the game server endpoint.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> &Url {
        &self.inner.ws_url
    }

    /// Returns the default per-session options.
    #[inline]
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        self.inner.session
    }
}

// ============================================================================
// Client - Internal
// ============================================================================

impl Client {
    /// Creates a client from validated configuration.
    pub(crate) fn new(inner: ClientInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;
    use crate::protocol::{ServerMessage, Side};
    use crate::test_support::{HttpStub, Reply, WsServer, init_tracing, test_http_client};
    use crate::transport::{SessionEvent, SessionState};

    #[test]
    fn test_components_share_configuration() {
        let client = Client::builder()
            .matchmaking_url("http://mm.example.com/api")
            .engine_url("http://engine.example.com")
            .match_timeout(Duration::from_secs(7))
            .retry(RetryPolicy::no_retry())
            .build()
            .expect("client");

        let matchmaking = client.matchmaking();
        assert_eq!(matchmaking.timeout(), Duration::from_secs(7));
        assert!(!matchmaking.is_in_flight());

        let engine = client.engine();
        assert_eq!(engine.retry_policy().max_attempts(), 1);
    }

    #[test]
    fn test_matchmaking_instances_are_independent() {
        let client = Client::builder().build().expect("client");
        let first = client.matchmaking();
        let second = client.matchmaking();
        first.cancel_match();
        assert!(!first.is_in_flight());
        assert!(!second.is_in_flight());
    }

    #[tokio::test]
    async fn test_find_and_connect() -> anyhow::Result<()> {
        init_tracing();
        let ws = WsServer::bind().await;
        let mm = HttpStub::start(vec![Reply::ok(
            r#"{"result":"Ok","value":{"game_id":"g7","color":"White"}}"#,
        )])
        .await;

        let client = Client::builder()
            .ws_url(ws.url())
            .matchmaking_url(mm.url())
            .http_client(test_http_client())
            .build()?;

        let task = tokio::spawn({
            let client = client.clone();
            async move {
                let matchmaking = client.matchmaking();
                client.find_and_connect(&matchmaking, "alice").await
            }
        });

        let mut peer = ws.accept().await;
        let auth = peer.recv_json().await;
        assert_eq!(
            auth,
            serde_json::json!({"kind": "Auth", "value": {"game_id": "g7", "user_id": "alice"}})
        );

        let (found, session, mut events) = task.await??;
        assert_eq!(found.side, Side::White);
        assert_eq!(session.game_id().as_str(), "g7");
        assert_eq!(session.user_id().as_str(), "alice");

        peer.send(&ServerMessage::AuthSuccess).await;
        assert!(matches!(events.next().await, Some(SessionEvent::Authenticated)));
        assert_eq!(session.state(), SessionState::Authenticated);

        session.disconnect();
        Ok(())
    }

    #[tokio::test]
    async fn test_find_and_connect_stops_on_match_failure() {
        let mm = HttpStub::start(vec![Reply::ok(r#"{"result":"Err","value":"empty queue"}"#)]).await;
        let client = Client::builder()
            .ws_url("ws://127.0.0.1:1/ws")
            .matchmaking_url(mm.url())
            .http_client(test_http_client())
            .build()
            .expect("client");

        let matchmaking = client.matchmaking();
        let err = client.find_and_connect(&matchmaking, "alice").await.unwrap_err();
        assert!(matches!(err, Error::MatchFailed { .. }));
    }
}
