//! Retry with exponential backoff for idempotent reads.
//!
//! Every non-2xx status is retried the same way until the budget runs
//! out; there is no jitter. A request that gets no HTTP response at all
//! fails immediately with [`Error::Http`].

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::backoff::Backoff;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Total attempts, first try included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Wait before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Growth of the wait per failed attempt.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.5;

// ============================================================================
// RetryPolicy
// ============================================================================

/// Retry budget and backoff for [`fetch_with_retry`].
///
/// The wait after the `n`-th failed attempt (0-based) is
/// `base × factor^n`. With the defaults: 1000, 1500, 2250 and 3375 ms,
/// then failure after the fifth attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY, DEFAULT_BACKOFF_FACTOR)
    }
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` below 1 is treated as 1.
    #[inline]
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration, factor: f64) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            backoff: Backoff::exponential(base_delay, factor),
        }
    }

    /// Single attempt, no retries.
    #[inline]
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Returns the total number of attempts.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the wait after `attempts_used` failed attempts (0-based).
    #[inline]
    #[must_use]
    pub fn delay_for(&self, attempts_used: u32) -> Duration {
        self.backoff.delay(attempts_used)
    }

    /// Returns every wait the policy can incur, in order.
    #[must_use]
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts - 1).map(|n| self.delay_for(n)).collect()
    }
}

// ============================================================================
// RetryContext
// ============================================================================

/// Transient state of one retried request.
struct RetryContext {
    request: RequestBuilder,
    remaining: u32,
    delay: Duration,
}

impl RetryContext {
    fn new(request: RequestBuilder, policy: &RetryPolicy) -> Self {
        Self {
            request,
            remaining: policy.max_attempts(),
            delay: Duration::ZERO,
        }
    }

    /// Number of the attempt about to be made, starting at 1.
    fn attempt(&self, policy: &RetryPolicy) -> u32 {
        policy.max_attempts() - self.remaining + 1
    }

    /// Returns a fresh copy of the request for the next attempt.
    fn next_request(&self) -> Result<RequestBuilder> {
        self.request
            .try_clone()
            .ok_or_else(|| Error::invalid_argument("request with a streaming body cannot be retried"))
    }

    /// Records a failed attempt; returns `false` once the budget is spent.
    fn record_failure(&mut self, policy: &RetryPolicy) -> bool {
        let used = policy.max_attempts() - self.remaining;
        self.remaining -= 1;
        if self.remaining == 0 {
            return false;
        }
        self.delay = policy.delay_for(used);
        true
    }
}

// ============================================================================
// fetch_with_retry
// ============================================================================

/// Sends `request` until it succeeds or `policy` is exhausted, then
/// decodes the JSON body.
///
/// # Errors
///
/// - [`Error::RequestFailed`] with the last status after the final failed attempt
/// - [`Error::Http`] if no response was received; not retried
/// - [`Error::Deserialization`] if a successful body is not valid `T`
/// - [`Error::InvalidArgument`] if the request body cannot be cloned
pub async fn fetch_with_retry<T>(request: RequestBuilder, policy: &RetryPolicy) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut ctx = RetryContext::new(request, policy);

    loop {
        let attempt = ctx.attempt(policy);
        let response = ctx.next_request()?.send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(attempt, status = status.as_u16(), url = %response.url(), "Request succeeded");
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        if !ctx.record_failure(policy) {
            warn!(
                attempts = policy.max_attempts(),
                status = status.as_u16(),
                url = %response.url(),
                "Request failed, retries exhausted"
            );
            return Err(Error::request_failed(status.as_u16()));
        }

        warn!(
            attempt,
            remaining = ctx.remaining,
            status = status.as_u16(),
            delay_ms = ctx.delay.as_millis() as u64,
            "Request failed, retrying"
        );
        sleep(ctx.delay).await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde::Deserialize;

    use crate::test_support::{HttpStub, Reply, init_tracing, test_http_client};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        message: String,
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_millis(5), 1.5)
    }

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.schedule(), ms(&[1000, 1500, 2250, 3375]));
    }

    #[test]
    fn test_delay_for_follows_power_law() {
        let policy = RetryPolicy::default();
        for n in 0..4 {
            let expected = (1000.0 * 1.5f64.powi(n as i32)).round() as u64;
            assert_eq!(policy.delay_for(n), Duration::from_millis(expected));
        }
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10), 2.0);
        assert_eq!(policy.max_attempts(), 1);
        assert!(policy.schedule().is_empty());
        assert!(RetryPolicy::no_retry().schedule().is_empty());
    }

    #[test]
    fn test_context_counts_down() {
        let policy = RetryPolicy::default();
        let request = test_http_client().get("http://127.0.0.1:1/");
        let mut ctx = RetryContext::new(request, &policy);

        let mut delays = Vec::new();
        assert_eq!(ctx.attempt(&policy), 1);
        while ctx.record_failure(&policy) {
            delays.push(ctx.delay);
        }
        assert_eq!(delays, policy.schedule());
        assert_eq!(ctx.remaining, 0);
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let stub = HttpStub::start(vec![Reply::ok(r#"{"message":"ready"}"#)]).await;
        let request = test_http_client().get(stub.url());

        let pong: Pong = fetch_with_retry(request, &fast_policy()).await.expect("fetch");
        assert_eq!(pong.message, "ready");
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_failures() {
        init_tracing();
        let stub = HttpStub::start(vec![
            Reply::status(500, ""),
            Reply::status(503, ""),
            Reply::ok(r#"{"message":"ready"}"#),
        ])
        .await;
        let request = test_http_client().get(stub.url());

        let pong: Pong = fetch_with_retry(request, &fast_policy()).await.expect("fetch");
        assert_eq!(pong.message, "ready");
        assert_eq!(stub.hits(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_five_attempts() {
        init_tracing();
        let stub = HttpStub::start_with_fallback(vec![], Some(Reply::status(500, ""))).await;
        let request = test_http_client().get(stub.url());

        let err = fetch_with_retry::<Pong>(request, &fast_policy()).await.unwrap_err();
        assert!(matches!(err, Error::RequestFailed { status: 500 }));
        assert_eq!(err.to_string(), "Request failed: 500");
        assert_eq!(stub.hits(), 5);
    }

    #[tokio::test]
    async fn test_client_errors_are_retried_too() {
        let stub = HttpStub::start_with_fallback(vec![], Some(Reply::status(404, ""))).await;
        let request = test_http_client().get(stub.url());

        let err = fetch_with_retry::<Pong>(request, &fast_policy()).await.unwrap_err();
        assert!(matches!(err, Error::RequestFailed { status: 404 }));
        assert_eq!(stub.hits(), 5);
    }

    #[tokio::test]
    async fn test_transport_failure_not_retried() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let request = test_http_client().get(format!("http://127.0.0.1:{port}/"));
        let err = fetch_with_retry::<Pong>(request, &fast_policy()).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_bad_body_is_deserialization_error() {
        let stub = HttpStub::start(vec![Reply::ok("not json")]).await;
        let request = test_http_client().get(stub.url());

        let err = fetch_with_retry::<Pong>(request, &fast_policy()).await.unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
        assert_eq!(stub.hits(), 1);
    }
}
