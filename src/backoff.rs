//! Delay shapes shared by reconnection and request retries.
//!
//! | Shape | Delay for step `n` |
//! |-------|--------------------|
//! | [`Backoff::Linear`] | `base × n` |
//! | [`Backoff::Exponential`] | `base × factor^n` |
//!
//! Both shapes can be capped. There is no jitter.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Backoff
// ============================================================================

/// How the wait between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// `base × step`.
    Linear {
        /// Delay unit.
        base: Duration,
        /// Upper bound, if any.
        max: Option<Duration>,
    },
    /// `base × factor^step`.
    Exponential {
        /// Delay at step 0.
        base: Duration,
        /// Growth factor per step.
        factor: f64,
        /// Upper bound, if any.
        max: Option<Duration>,
    },
}

impl Backoff {
    /// Creates an uncapped linear backoff.
    #[inline]
    #[must_use]
    pub const fn linear(base: Duration) -> Self {
        Self::Linear { base, max: None }
    }

    /// Creates an uncapped exponential backoff.
    #[inline]
    #[must_use]
    pub const fn exponential(base: Duration, factor: f64) -> Self {
        Self::Exponential {
            base,
            factor,
            max: None,
        }
    }

    /// Caps every computed delay at `max`.
    #[inline]
    #[must_use]
    pub const fn with_max(self, max: Duration) -> Self {
        match self {
            Self::Linear { base, .. } => Self::Linear {
                base,
                max: Some(max),
            },
            Self::Exponential { base, factor, .. } => Self::Exponential {
                base,
                factor,
                max: Some(max),
            },
        }
    }

    /// Returns the delay for `step`.
    ///
    /// Callers choose the step numbering: reconnection counts attempts from
    /// 1, request retries count attempts already used from 0.
    #[must_use]
    pub fn delay(&self, step: u32) -> Duration {
        let (delay, max) = match *self {
            Self::Linear { base, max } => (base.saturating_mul(step), max),
            Self::Exponential { base, factor, max } => {
                let exponent = i32::try_from(step).unwrap_or(i32::MAX);
                let millis = base.as_secs_f64() * 1000.0 * factor.powi(exponent);
                (millis_to_duration(millis), max)
            }
        };

        match max {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

/// Converts fractional milliseconds, saturating on overflow.
fn millis_to_duration(millis: f64) -> Duration {
    if !millis.is_finite() || millis >= u64::MAX as f64 {
        return Duration::from_millis(u64::MAX);
    }
    Duration::from_millis(millis.max(0.0).round() as u64)
}

// ============================================================================
// Tests
// ============================================================================
