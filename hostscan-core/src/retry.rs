//! Per-URL retries with exponential backoff.
//!
//! Each candidate URL gets `retries + 1` attempts. A failed attempt that still
//! has a successor is followed by a pause of `initial_delay * 2^attempt`.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, ScanError};

/// Upper bound on a single backoff pause.
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Attempt budget and backoff base for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one. Never zero.
    pub max_attempts: usize,
    /// Pause after the first failed attempt.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Policy allowing `retries` retries after the first attempt.
    pub fn new(retries: usize, initial_delay: Duration) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            initial_delay,
        }
    }

    /// Pause after the failed attempt with the given 0-based index.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let factor = 1u32 << attempt.min(20);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }
}

/// Whether a failed fetch is worth another attempt.
///
/// Timeouts and connection failures are; so is any transport error except a
/// request that could not be built.
pub fn is_retryable(error: &ScanError) -> bool {
    match error {
        ScanError::Timeout(_) | ScanError::Connection(_) => true,
        ScanError::Http(e) => !e.is_builder(),
        _ => false,
    }
}

/// Runs an async operation under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Executes `operation`, retrying retryable failures with backoff.
    ///
    /// The closure receives the 0-based attempt index. After more than one
    /// failed attempt the error is wrapped in [`ScanError::RetryExhausted`].
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            let err = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let last_attempt = attempt + 1 >= self.policy.max_attempts;
            if !is_retryable(&err) || last_attempt {
                if attempt == 0 {
                    return Err(err);
                }
                warn!(attempts = attempt + 1, error = %err, "Giving up on URL");
                return Err(ScanError::RetryExhausted {
                    attempts: attempt + 1,
                    last_error: err.to_string(),
                });
            }

            let delay = self.policy.delay_for_attempt(attempt);
            debug!(
                attempt = attempt + 1,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying after transient error"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
