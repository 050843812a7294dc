//! Client for the move-suggestion engine.
//!
//! All three queries are plain `GET`s sent through
//! [`fetch_with_retry`](super::fetch_with_retry).

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;
use url::Url;

use crate::endpoint;
use crate::error::{Error, Result};

use super::retry::{RetryPolicy, fetch_with_retry};
use super::types::{BestMove, BestMoveReply, EngineSelfTest, EngineStatus};

// ============================================================================
// EngineClient
// ============================================================================

/// Client for the engine service.
///
/// # Example
///
/// ```no_run
/// use chess_link::EngineClient;
///
/// # async fn example() -> chess_link::Result<()> {
/// let engine = EngineClient::new("http://localhost:4000")?;
/// let suggestion = engine
///     .best_move("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
///     .await?;
/// println!("{} -> {}", suggestion.best_move, suggestion.new_fen);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EngineClient {
    base: Url,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl EngineClient {
    /// Creates a client for the service at `endpoint` with the default
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `endpoint` is not an `http`/`https` URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        let base = endpoint::parse(endpoint, endpoint::HTTP_SCHEMES).map_err(Error::config)?;
        Ok(Self::from_url(base, reqwest::Client::new(), RetryPolicy::default()))
    }

    /// Creates a client from an already validated base URL.
    pub(crate) fn from_url(base: Url, http: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { base, http, retry }
    }

    /// Sets the retry policy.
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Uses a preconfigured HTTP client.
    #[inline]
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Returns the retry policy.
    #[inline]
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Queries service health.
    pub async fn status(&self) -> Result<EngineStatus> {
        self.get(endpoint::join(&self.base, &[""])).await
    }

    /// Asks the service to round-trip a command to the engine process.
    pub async fn self_test(&self) -> Result<EngineSelfTest> {
        self.get(endpoint::join(&self.base, &["test"])).await
    }

    /// Requests the best move for the position in `fen`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for a blank FEN, without sending anything
    /// - [`Error::Remote`] if the engine answers with an error body; not retried
    /// - otherwise as [`fetch_with_retry`]
    pub async fn best_move(&self, fen: &str) -> Result<BestMove> {
        let fen = fen.trim();
        if fen.is_empty() {
            return Err(Error::invalid_argument("FEN must not be empty"));
        }

        let mut url = endpoint::join(&self.base, &["bestmove"]);
        url.set_query(Some(&format!("fen={}", urlencoding::encode(fen))));

        let reply: BestMoveReply = self.get(url).await?;
        reply.into_result()
    }

    async fn get<T>(&self, url: Url) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(%url, "Engine query");
        fetch_with_retry(self.http.get(url), &self.retry).await
    }
}

// ============================================================================
// Tests
// ============================================================================
