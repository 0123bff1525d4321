//! Retry policy for transient transport failures.
//!
//! A small standalone policy object so the retry behavior is testable
//! without a network: attempt budget, fixed inter-attempt delay, and a
//! non-retryable predicate keyed on the error classification.

use crate::error::TransportError;
use std::time::Duration;

/// Default total attempt budget per request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fixed-delay retry policy with an error-kind-sensitive short circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, counting the original call.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            // At least one attempt always happens.
            max_retries: max_retries.max(1),
            delay,
        }
    }

    /// Policy that never retries (single attempt).
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Whether another attempt should be made after `error` on attempt
    /// number `attempt` (1-based).
    ///
    /// Authentication failures short-circuit: retrying a 401 cannot
    /// succeed without new credentials. Client-side rejections (400,
    /// 404, 409, decode) are equally terminal.
    pub fn should_retry(&self, error: &TransportError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}
