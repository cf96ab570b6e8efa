//! Bounded retry with exponential backoff
//!
//! One policy object is shared by every network call site (SPARQL queries,
//! Airtable list/patch/create).
//!
//! **Algorithm:**
//! 1. Attempt operation
//! 2. If successful, return result
//! 3. If the error is transient (retryable HTTP status or timeout):
//!    a. If attempts remain: log WARN, backoff, retry
//!    b. Otherwise: log ERROR, return the last error
//! 4. Any other error is returned immediately (no retry)

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Statuses worth retrying: rate limited or upstream temporarily unavailable
pub const DEFAULT_RETRYABLE_STATUSES: [u16; 4] = [429, 502, 503, 504];

/// Explicit retry policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Growth factor applied per further attempt
    pub multiplier: f64,
    /// Cap for a single backoff sleep
    pub max_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    /// 4 attempts, 1.5s → 3s → 6s, capped at 16s
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(1500),
            multiplier: 2.0,
            max_delay: Duration::from_secs(16),
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no sleeping
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Millisecond-scale delays for tests
    pub fn fast(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(1),
            multiplier: 2.0,
            max_delay: Duration::from_millis(5),
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
        }
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Whether `err` is transient under this policy
    pub fn is_retryable(&self, err: &Error) -> bool {
        match err {
            Error::Http { status, .. } => self.is_retryable_status(*status),
            Error::Timeout(_) => true,
            _ => false,
        }
    }

    /// Backoff before attempt `attempt + 1` (attempt is 1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }

    /// Run `operation` under this policy
    ///
    /// # Arguments
    /// * `operation_name` - Name for logging (e.g., "list records", "resolve QID")
    /// * `operation` - Async closure, invoked once per attempt
    pub async fn run<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        tracing::debug!(
                            operation = operation_name,
                            attempt,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if !self.is_retryable(&err) {
                        return Err(err);
                    }

                    if attempt >= max_attempts {
                        tracing::error!(
                            operation = operation_name,
                            attempt,
                            error = %err,
                            "Operation failed: retries exhausted"
                        );
                        return Err(err);
                    }

                    let backoff = self.delay_for(attempt);
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Transient failure, will retry after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
