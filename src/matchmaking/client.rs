//! Single-flight matchmaking client.
//!
//! At most one pairing request is outstanding per [`MatchmakingClient`].
//! The in-flight slot is claimed synchronously on the first poll of
//! [`find_match`](MatchmakingClient::find_match), before any network I/O,
//! and released by a drop guard on every exit path: success, failure,
//! cancellation, timeout, or the caller dropping the future.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::StatusCode;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::endpoint;
use crate::error::{CancelReason, Error, Result};
use crate::identifiers::{MatchRequestId, UserId};

use super::response::{MatchFound, MatchRequestBody, MatchResponse};

// ============================================================================
// Constants
// ============================================================================

/// Default bound on one pairing attempt.
pub const DEFAULT_MATCH_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// Types
// ============================================================================

/// The request currently holding the single-flight slot.
struct ActiveRequest {
    id: MatchRequestId,
    user_id: UserId,
    cancel: CancellationToken,
}

/// Releases the slot when a `find_match` call ends, if it still owns it.
struct InFlightGuard<'a> {
    slot: &'a Mutex<Option<ActiveRequest>>,
    id: MatchRequestId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|active| active.id == self.id) {
            *slot = None;
        }
    }
}

// ============================================================================
// MatchmakingClient
// ============================================================================

/// Client for the matchmaking service.
///
/// Caller-owned; share it behind an `Arc` if several tasks need to find
/// or cancel matches through the same single-flight slot.
///
/// # Example
///
/// ```no_run
/// use chess_link::MatchmakingClient;
///
/// # async fn example() -> chess_link::Result<()> {
/// let matchmaking = MatchmakingClient::new("http://localhost:8001")?;
/// let found = matchmaking.find_match("alice").await?;
/// println!("joining {} as {}", found.game_id, found.side.as_char());
/// # Ok(())
/// # }
/// ```
pub struct MatchmakingClient {
    /// `{endpoint}/match`.
    match_url: Url,
    http: reqwest::Client,
    timeout: Duration,
    active: Mutex<Option<ActiveRequest>>,
}

impl fmt::Debug for MatchmakingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchmakingClient")
            .field("match_url", &self.match_url.as_str())
            .field("timeout", &self.timeout)
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MatchmakingClient - Construction
// ============================================================================

impl MatchmakingClient {
    /// Creates a client for the service at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `endpoint` is not an `http`/`https` URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        let base = endpoint::parse(endpoint, endpoint::HTTP_SCHEMES).map_err(Error::config)?;
        Ok(Self::from_url(&base, reqwest::Client::new(), DEFAULT_MATCH_TIMEOUT))
    }

    /// Creates a client from an already validated base URL.
    pub(crate) fn from_url(base: &Url, http: reqwest::Client, timeout: Duration) -> Self {
        Self {
            match_url: endpoint::join(base, &["match"]),
            http,
            timeout,
            active: Mutex::new(None),
        }
    }

    /// Sets the bound on one pairing attempt.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses a preconfigured HTTP client.
    #[inline]
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Returns the pairing timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// ============================================================================
// MatchmakingClient - Public API
// ============================================================================

impl MatchmakingClient {
    /// Requests an opponent for `user_id`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `user_id` is blank
    /// - [`Error::AlreadyInProgress`] if another request is active; no I/O is performed
    /// - [`Error::Cancelled`] if [`cancel_match`](Self::cancel_match) was called or the timeout fired
    /// - [`Error::ServerError`] on a non-2xx response
    /// - [`Error::MatchFailed`] if the service answered with an `Err` result
    /// - [`Error::Deserialization`] if the body is not a result union
    /// - [`Error::Http`] if the service could not be reached
    pub async fn find_match(&self, user_id: impl Into<String>) -> Result<MatchFound> {
        let user_id = UserId::new(user_id)?;
        let id = MatchRequestId::generate();
        let cancel = CancellationToken::new();

        {
            let mut slot = self.active.lock();
            if slot.is_some() {
                warn!(%user_id, "Matchmaking request already in progress");
                return Err(Error::AlreadyInProgress);
            }
            *slot = Some(ActiveRequest {
                id,
                user_id: user_id.clone(),
                cancel: cancel.clone(),
            });
        }
        let _guard = InFlightGuard {
            slot: &self.active,
            id,
        };

        info!(%user_id, request_id = %id, "Finding match");

        let result = tokio::select! {
            biased;

            () = cancel.cancelled() => Err(Error::cancelled(CancelReason::Requested)),

            () = sleep(self.timeout) => {
                cancel.cancel();
                Err(Error::cancelled(CancelReason::TimedOut))
            }

            result = self.request(&user_id) => result,
        };

        match &result {
            Ok(found) => info!(
                request_id = %id,
                %user_id,
                game_id = %found.game_id,
                side = %found.side,
                "Match found"
            ),
            Err(e) if e.is_timeout() => warn!(
                request_id = %id,
                %user_id,
                timeout_ms = self.timeout.as_millis() as u64,
                "Matchmaking timed out"
            ),
            Err(e) => info!(request_id = %id, %user_id, error = %e, "Matchmaking ended without a match"),
        }

        result
    }

    /// Cancels the active request, if any.
    ///
    /// The slot is released before this returns; the pending `find_match`
    /// resolves with [`Error::Cancelled`].
    pub fn cancel_match(&self) {
        let active = self.active.lock().take();
        match active {
            Some(active) => {
                info!(request_id = %active.id, user_id = %active.user_id, "Cancelling match request");
                active.cancel.cancel();
            }
            None => debug!("No active match request to cancel"),
        }
    }

    /// Returns `true` while a request holds the single-flight slot.
    #[inline]
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Returns the user the active request is pairing, if any.
    #[must_use]
    pub fn active_user(&self) -> Option<UserId> {
        self.active.lock().as_ref().map(|active| active.user_id.clone())
    }
}

// ============================================================================
// MatchmakingClient - Internal
// ============================================================================

impl MatchmakingClient {
    async fn request(&self, user_id: &UserId) -> Result<MatchFound> {
        let response = self
            .http
            .post(self.match_url.clone())
            .json(&MatchRequestBody { user_id })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), "Matchmaking response received");

        if !status.is_success() {
            let detail = server_error_detail(status, &body);
            warn!(status = status.as_u16(), %detail, "Matchmaking server error");
            return Err(Error::server_error(detail));
        }

        match serde_json::from_str::<MatchResponse>(&body)? {
            MatchResponse::Ok(assignment) => Ok(assignment.into()),
            MatchResponse::Err(message) => Err(Error::match_failed(message)),
        }
    }
}

/// Detail for a non-2xx response: the `Err` message, else the body, else the status.
fn server_error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(MatchResponse::Err(message)) = serde_json::from_str::<MatchResponse>(body) {
        return message;
    }

    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
