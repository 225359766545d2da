//! Retry policy with exponential backoff.

use nexus_protocol::{NexusError, Result};
use rand::Rng;
use std::time::Duration;

/// Backoff policy applied by the transport between attempts.
///
/// Delay grows exponentially from `base_delay`, capped at `max_delay`.
/// With jitter enabled each delay is drawn from the upper half of the
/// computed window (equal jitter), so it still never exceeds `max_delay`.
///
/// # Example
///
/// ```
/// use nexus_client::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_secs(2))
///     .unwrap()
///     .with_jitter(false);
/// assert_eq!(policy.delay_for(1), Duration::from_millis(100));
/// assert_eq!(policy.delay_for(2), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` counts the initial attempt, so it must
    /// be at least 1; `base_delay` must not exceed `max_delay`.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(NexusError::Validation {
                field: "max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if base_delay > max_delay {
            return Err(NexusError::Validation {
                field: "base_delay".into(),
                reason: "must not exceed max_delay".into(),
            });
        }
        Ok(Self {
            max_attempts,
            base_delay,
            max_delay,
            jitter: true,
        })
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to sleep before retry number `retry` (1-based: the delay between
    /// the first and second attempts is `delay_for(1)`).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let half = delay / 2;
        let jittered = rand::rng().random_range(0..=half.as_nanos() as u64);
        half + Duration::from_nanos(jittered)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}
