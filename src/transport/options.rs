//! Per-session configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use chess_link::{PreAuthPolicy, ReconnectPolicy, SessionOptions};
//!
//! let options = SessionOptions::new()
//!     .with_reconnect(ReconnectPolicy::aggressive())
//!     .with_pre_auth(PreAuthPolicy::Deliver);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::backoff::Backoff;

// ============================================================================
// Constants
// ============================================================================

/// Reconnect attempts before giving up.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Linear reconnect delay unit.
const DEFAULT_RECONNECT_STEP: Duration = Duration::from_millis(2000);

// ============================================================================
// ReconnectPolicy
// ============================================================================

/// When and how a session reopens after an abnormal closure.
///
/// The default allows 3 attempts, waiting `attempt × 2000ms` before each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Backoff::linear(DEFAULT_RECONNECT_STEP))
    }
}

impl ReconnectPolicy {
    /// Creates a policy with an explicit budget and delay shape.
    #[inline]
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Never reconnect; every abnormal closure ends the session.
    #[inline]
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0, Backoff::linear(Duration::ZERO))
    }

    /// Five attempts, `1000ms × 1.5^n` capped at 10 s.
    #[inline]
    #[must_use]
    pub const fn aggressive() -> Self {
        Self::new(
            5,
            Backoff::exponential(Duration::from_millis(1000), 1.5)
                .with_max(Duration::from_secs(10)),
        )
    }

    /// Returns `true` if at least one attempt is allowed.
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.max_attempts > 0
    }

    /// Returns the attempt budget.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear { .. } => self.backoff.delay(attempt),
            Backoff::Exponential { .. } => self.backoff.delay(attempt.saturating_sub(1)),
        }
    }
}

// ============================================================================
// PreAuthPolicy
// ============================================================================

/// What happens to game events that arrive before `AuthSuccess`.
///
/// Server `Error` messages and decode failures are delivered immediately
/// under every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreAuthPolicy {
    /// Deliver as they arrive.
    Deliver,
    /// Hold them and deliver right after `Authenticated`, in arrival order.
    #[default]
    Buffer,
    /// Discard them.
    Drop,
}

// ============================================================================
// SessionOptions
// ============================================================================

/// Configuration for one [`GameSession`](super::GameSession).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionOptions {
    /// Reconnection behaviour.
    pub reconnect: ReconnectPolicy,

    /// Pre-authentication event handling.
    pub pre_auth: PreAuthPolicy,
}

impl SessionOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that never reconnect.
    #[inline]
    #[must_use]
    pub fn fail_fast() -> Self {
        Self {
            reconnect: ReconnectPolicy::disabled(),
            ..Self::default()
        }
    }

    /// Sets the reconnection policy.
    #[inline]
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Sets the pre-authentication policy.
    #[inline]
    #[must_use]
    pub fn with_pre_auth(mut self, pre_auth: PreAuthPolicy) -> Self {
        self.pre_auth = pre_auth;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ReconnectPolicy::default();
        assert!(policy.is_enabled());
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(6000));
    }

    #[test]
    fn test_disabled_policy() {
        assert!(!ReconnectPolicy::disabled().is_enabled());
        assert!(!SessionOptions::fail_fast().reconnect.is_enabled());
    }

    #[test]
    fn test_aggressive_policy() {
        let policy = ReconnectPolicy::aggressive();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(50), Duration::from_secs(10));
    }

    #[test]
    fn test_default_options() {
        let options = SessionOptions::new();
        assert_eq!(options.pre_auth, PreAuthPolicy::Buffer);
        assert_eq!(options.reconnect, ReconnectPolicy::default());
    }

    #[test]
    fn test_builder_chain() {
        let options = SessionOptions::new()
            .with_reconnect(ReconnectPolicy::disabled())
            .with_pre_auth(PreAuthPolicy::Drop);
        assert_eq!(options.pre_auth, PreAuthPolicy::Drop);
        assert!(!options.reconnect.is_enabled());
    }
}
