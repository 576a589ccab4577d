//! Bounded retry with exponential backoff for external-collaborator calls.

use std::fmt::Display;
use std::future::Future;
use tokio::time::Duration;
use tracing::warn;

/// Retry policy applied to external-collaborator calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay; doubles after each failed attempt.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
        }
    }

    /// Backoff delay after the given 1-based attempt: base, 2x, 4x, ...
    fn delay_after(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms << (attempt - 1).min(16))
    }
}

/// Run `operation` until it succeeds, the error is classified
/// non-retryable, or the policy's attempts are exhausted.
///
/// Only transient failures are retried; the caller supplies the
/// classification so configuration and validation errors propagate
/// immediately.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    is_retryable: impl Fn(&E) -> bool,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, will retry"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
