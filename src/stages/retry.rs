//! Uniform retry policy for external stage calls.
//!
//! Every stage call goes through [`run_with_retry`]: up to
//! [`RetryPolicy::max_attempts`] attempts, exponential backoff between
//! retryable failures, immediate abort on non-retryable ones.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use super::ServiceError;

/// Default attempt budget per stage call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry budget and backoff shape for one stage call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub base_delay: Duration,
    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given attempt number (1-indexed).
    fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// A stage call that failed for good: either a non-retryable error, or a
/// retryable one that exhausted the attempt budget.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{stage} failed after {attempts} attempt(s): {error}")]
pub struct StageFailure {
    /// The stage that failed (e.g. "storyboard").
    pub stage: &'static str,
    /// Attempts actually made.
    pub attempts: u32,
    /// The final error.
    pub error: ServiceError,
}

impl StageFailure {
    /// Whether resubmitting the whole job could succeed.
    pub fn is_retryable(&self) -> bool {
        self.error.is_retryable()
    }
}

/// Run one external call with the uniform retry policy.
///
/// `op` is invoked once per attempt. Retryable failures back off
/// exponentially between attempts; a non-retryable failure aborts
/// immediately with the attempts made so far.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    stage: &'static str,
    mut op: F,
) -> Result<T, StageFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !error.is_retryable() || attempt >= max_attempts {
                    return Err(StageFailure {
                        stage,
                        attempts: attempt,
                        error,
                    });
                }

                let delay = policy.delay_after(attempt);
                warn!(
                    stage,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Stage call failed; retrying after backoff"
                );
                sleep(delay).await;
            }
        }
    }
}
