//! Bounded-attempt retry for fallible side-effecting operations
//!
//! The pipeline wraps cover generation (and any other flaky collaborator)
//! in a [`RetryPolicy`]. Backoff is a fixed pause, not exponential: the
//! upstream APIs rate-limit on burst volume, and a constant two-second gap
//! is what they tolerate. Exhaustion is a distinct outcome from a single
//! transient failure so callers can decide between "retrying" and "give up
//! on this work item".

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::{AutopressError, Result};

/// Retry policy with a bounded attempt count and a constant backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of invocations allowed (not "retries after the first")
    pub max_attempts: u32,
    /// Pause between consecutive attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

/// All attempts failed; carries the final error
#[derive(Debug)]
pub struct Exhausted {
    /// How many times the operation ran
    pub attempts: u32,
    /// The error from the last attempt
    pub last_error: AutopressError,
}

impl std::fmt::Display for Exhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "exhausted after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl std::error::Error for Exhausted {}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// The closure receives the 1-based attempt number. Success returns
    /// immediately without further invocations; after the final failure the
    /// last error is returned inside [`Exhausted`].
    pub async fn run<T, F, Fut>(&self, mut op: F) -> std::result::Result<T, Exhausted>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let budget = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=budget {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("Attempt {}/{} failed: {}", attempt, budget, e);
                    last_error = Some(e);
                    if attempt < budget {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        Err(Exhausted {
            attempts: budget,
            last_error: last_error
                .unwrap_or_else(|| AutopressError::Other("retry budget was zero".to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt_runs_once() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fail_twice_then_succeed() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(AutopressError::Generation(format!("boom {}", attempt)))
                    } else {
                        Ok("third time")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "third time");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_error() {
        let calls = AtomicU32::new(0);
        let result: std::result::Result<(), Exhausted> = fast_policy(2)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(AutopressError::Generation(format!("boom {}", attempt))) }
            })
            .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(exhausted.last_error.to_string().contains("boom 2"));
    }

    #[tokio::test]
    async fn test_zero_budget_is_clamped_to_one() {
        let calls = AtomicU32::new(0);
        let result: std::result::Result<(), Exhausted> = fast_policy(0)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AutopressError::Other("nope".to_string())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
