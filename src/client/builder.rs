//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use chess_link::{Client, ReconnectPolicy};
//!
//! # fn example() -> chess_link::Result<()> {
//! let client = Client::builder()
//!     .ws_url("wss://chess.example.com/ws")
//!     .matchmaking_url("https://chess.example.com/matchmaking")
//!     .reconnect(ReconnectPolicy::aggressive())
//!     .match_timeout(Duration::from_secs(30))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::endpoint;
use crate::engine::RetryPolicy;
use crate::error::{Error, Result};
use crate::matchmaking::DEFAULT_MATCH_TIMEOUT;
use crate::transport::{PreAuthPolicy, ReconnectPolicy, SessionOptions};

use super::core::{Client, ClientInner};

// ============================================================================
// Constants
// ============================================================================

/// Default game server endpoint.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Default matchmaking service endpoint.
pub const DEFAULT_MATCHMAKING_URL: &str = "http://localhost:8001";

/// Default engine service endpoint.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:4000";

/// Environment variable overriding the game server endpoint.
pub const ENV_WS_URL: &str = "CHESS_WS_URL";

/// Environment variable overriding the matchmaking endpoint.
pub const ENV_MATCHMAKING_URL: &str = "CHESS_MATCHMAKING_URL";

/// Environment variable overriding the engine endpoint.
pub const ENV_ENGINE_URL: &str = "CHESS_ENGINE_URL";

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    ws_url: String,
    matchmaking_url: String,
    engine_url: String,
    session: SessionOptions,
    match_timeout: Duration,
    retry: RetryPolicy,
    http: Option<reqwest::Client>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            matchmaking_url: DEFAULT_MATCHMAKING_URL.to_string(),
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            session: SessionOptions::default(),
            match_timeout: DEFAULT_MATCH_TIMEOUT,
            retry: RetryPolicy::default(),
            http: None,
        }
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a builder with the default local endpoints.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with defaults overridden by `CHESS_WS_URL`,
    /// `CHESS_MATCHMAKING_URL` and `CHESS_ENGINE_URL` when set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::default();
        let overrides = [
            (ENV_WS_URL, &mut builder.ws_url),
            (ENV_MATCHMAKING_URL, &mut builder.matchmaking_url),
            (ENV_ENGINE_URL, &mut builder.engine_url),
        ];

        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                debug!(key, %value, "Endpoint from environment");
                *slot = value;
            }
        }
        builder
    }

    /// Sets the game server endpoint (`ws://` or `wss://`).
    #[inline]
    #[must_use]
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = url.into();
        self
    }

    /// Sets the matchmaking service endpoint.
    #[inline]
    #[must_use]
    pub fn matchmaking_url(mut self, url: impl Into<String>) -> Self {
        self.matchmaking_url = url.into();
        self
    }

    /// Sets the engine service endpoint.
    #[inline]
    #[must_use]
    pub fn engine_url(mut self, url: impl Into<String>) -> Self {
        self.engine_url = url.into();
        self
    }

    /// Sets the reconnection policy for game sessions.
    #[inline]
    #[must_use]
    pub fn reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.session.reconnect = policy;
        self
    }

    /// Sets how game events received before `AuthSuccess` are handled.
    #[inline]
    #[must_use]
    pub fn pre_auth(mut self, policy: PreAuthPolicy) -> Self {
        self.session.pre_auth = policy;
        self
    }

    /// Replaces the whole per-session option set.
    #[inline]
    #[must_use]
    pub fn session_options(mut self, options: SessionOptions) -> Self {
        self.session = options;
        self
    }

    /// Sets the bound on one matchmaking attempt.
    #[inline]
    #[must_use]
    pub fn match_timeout(mut self, timeout: Duration) -> Self {
        self.match_timeout = timeout;
        self
    }

    /// Sets the retry policy for engine queries.
    #[inline]
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Uses a preconfigured HTTP client for matchmaking and engine calls.
    #[inline]
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if an endpoint is malformed or uses the wrong scheme
    /// - [`Error::Config`] if the matchmaking timeout is zero
    pub fn build(self) -> Result<Client> {
        let ws_url = validate_url("game server", &self.ws_url, endpoint::WS_SCHEMES)?;
        let matchmaking_url =
            validate_url("matchmaking", &self.matchmaking_url, endpoint::HTTP_SCHEMES)?;
        let engine_url = validate_url("engine", &self.engine_url, endpoint::HTTP_SCHEMES)?;

        if self.match_timeout.is_zero() {
            return Err(Error::config("Matchmaking timeout must be greater than zero"));
        }

        Ok(Client::new(ClientInner {
            ws_url,
            matchmaking_url,
            engine_url,
            session: self.session,
            match_timeout: self.match_timeout,
            retry: self.retry,
            http: self.http.unwrap_or_default(),
        }))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_url(name: &str, raw: &str, schemes: &[&str]) -> Result<Url> {
    endpoint::parse(raw, schemes).map_err(|reason| Error::config(format!("{name} endpoint: {reason}")))
}

// ============================================================================
// Tests
// ============================================================================
