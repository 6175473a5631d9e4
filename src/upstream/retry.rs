//! Bounded retry for transport calls.
//!
//! Only rate-limit failures are retried. Attempt `n` that gets rate limited
//! waits `delay * n` before the next one, so three attempts wait `delay` and
//! then `2 * delay`. Every other failure is returned straight away.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::error::Result;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Backoff after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }
}

/// Runs `op` until it succeeds, fails for a non-retryable reason, or the
/// policy's attempts are used up. In the last case the final rate-limit error
/// is returned.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} attempt {}/{} failed ({}), retrying in {:?}",
                    operation, attempt, policy.max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscriptError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn rate_limited() -> TranscriptError {
        TranscriptError::RateLimited("PMtlIBtqNJo".to_string())
    }

    #[test]
    fn test_policy_never_drops_below_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::from_secs(1)).max_attempts, 1);
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_rate_limits() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = Instant::now();

        let result = with_retry(&RetryPolicy::default(), "list", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(rate_limited())
            } else {
                Ok("catalog")
            }
        })
        .await;

        assert_eq!(result, Ok("catalog"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2 + 4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<()> = with_retry(&RetryPolicy::default(), "list", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(rate_limited())
        })
        .await;

        assert_eq!(result, Err(rate_limited()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = Instant::now();

        let result: Result<()> = with_retry(&RetryPolicy::default(), "list", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TranscriptError::TranscriptsDisabled("PMtlIBtqNJo".to_string()))
        })
        .await;

        assert!(matches!(result, Err(TranscriptError::TranscriptsDisabled(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
