//! Failure classification and linear backoff.
//!
//! Only [`ActionError::Retryable`] is eligible for another attempt. The wait
//! before attempt `k + 1` is exactly `backoff_ms * k`: no jitter, no cap, so
//! timing is reproducible.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ActionError;

/// Bounded retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Re-attempts allowed after the first attempt.
    pub retries: u32,
    /// Base backoff in milliseconds.
    pub backoff_ms: u64,
}

/// Outcome of a retry decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry(Duration),
    /// The retry budget is spent.
    GiveUp,
    /// The error is not retryable.
    NotRetryable,
}

impl RetryPolicy {
    /// Creates a new policy.
    #[must_use]
    pub fn new(retries: u32, backoff_ms: u64) -> Self {
        Self { retries, backoff_ms }
    }

    /// Total executor invocations allowed.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Backoff before the attempt following failed attempt `attempt_number`
    /// (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt_number: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt_number)))
    }

    /// Decides what to do after a failed attempt. `failures` counts failed
    /// attempts so far, including the one that produced `error`.
    #[must_use]
    pub fn decide(&self, error: &ActionError, failures: u32) -> RetryDecision {
        if !error.is_retryable() {
            RetryDecision::NotRetryable
        } else if failures <= self.retries {
            RetryDecision::Retry(self.backoff_for(failures))
        } else {
            RetryDecision::GiveUp
        }
    }

    /// Sum of all backoff waits if every attempt fails with a retryable error.
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        (1..=self.retries).map(|k| self.backoff_for(k)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::new(3, 10);
        assert_eq!(policy.backoff_for(1), Duration::from_millis(10));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(20));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(30));
        assert_eq!(policy.total_backoff(), Duration::from_millis(60));
    }

    #[test]
    fn test_zero_retries_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(
            policy.decide(&ActionError::retryable("busy"), 1),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn test_budget_is_respected() {
        let policy = RetryPolicy::new(2, 0);
        let err = ActionError::retryable("busy");

        assert_eq!(policy.decide(&err, 1), RetryDecision::Retry(Duration::ZERO));
        assert_eq!(policy.decide(&err, 2), RetryDecision::Retry(Duration::ZERO));
        assert_eq!(policy.decide(&err, 3), RetryDecision::GiveUp);
    }

    #[test]
    fn test_fatal_and_timeout_are_not_retryable() {
        let policy = RetryPolicy::new(5, 10);
        assert_eq!(
            policy.decide(&ActionError::fatal("bad"), 1),
            RetryDecision::NotRetryable
        );
        assert_eq!(
            policy.decide(&ActionError::timeout(50), 1),
            RetryDecision::NotRetryable
        );
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::new(u32::MAX, u64::MAX);
        assert_eq!(policy.max_attempts(), u32::MAX);
        assert_eq!(policy.backoff_for(2), Duration::from_millis(u64::MAX));
    }
}
