//! Capped exponential backoff for transient model failures.

use std::future::Future;
use std::time::Duration;

use log::warn;

use super::ModelError;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Wait after the first failure before clamping; doubles each time.
    pub base_delay: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(40),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    /// Wait after failed attempt `attempt` (1-based):
    /// `min(max(base * 2^(attempt-1), min), max)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let raw = self
            .base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay);
        raw.max(self.min_delay).min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// the policy's attempts are used up. The last error is returned.
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ModelError>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt, policy.max_attempts, e, delay
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
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant() -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn unavailable() -> ModelError {
        ModelError::Status {
            status: 503,
            body: "overloaded".into(),
        }
    }

    /// Fail with 503 `failures` times, then succeed.
    async fn run(failures: u32) -> (Result<u32, ModelError>, u32) {
        let calls = AtomicU32::new(0);
        let result = retry_transient(&instant(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < failures {
                    Err(unavailable())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[test]
    fn delays_follow_clamped_doubling() {
        let policy = RetryPolicy::default();
        let secs: Vec<u64> = (1..=8).map(|n| policy.delay_after(n).as_secs()).collect();
        assert_eq!(secs, vec![2, 2, 4, 8, 16, 32, 40, 40]);
        assert_eq!(policy.delay_after(200), Duration::from_secs(40));
    }

    #[tokio::test]
    async fn succeeds_when_failures_stay_below_ceiling() {
        for failures in [0, 1, 5, 9] {
            let (result, calls) = run(failures).await;
            assert_eq!(result.unwrap(), failures);
            assert_eq!(calls, failures + 1);
        }
    }

    #[tokio::test]
    async fn gives_up_after_ten_attempts() {
        let (result, calls) = run(10).await;
        assert!(matches!(result, Err(ModelError::Status { status: 503, .. })));
        assert_eq!(calls, 10);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transient(&instant(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ModelError::Status {
                    status: 400,
                    body: "bad request".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
