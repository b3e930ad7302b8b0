//! Retry with exponential backoff for generation calls
//!
//! Only failures the service marks as transient are retried. Everything else
//! is returned on the first attempt: a malformed request or a bad key will
//! fail the same way every time and each attempt costs quota.

use crate::config::ExtractorConfig;
use catalogue_domain::traits::RemoteFailure;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Why a retried operation gave up
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed transiently
    Exhausted {
        /// Calls made, including the first
        attempts: u32,
        /// Error from the final attempt
        last: E,
    },
    /// A non-transient failure ended the loop
    Fatal(E),
}

/// Bounded exponential backoff: `base, 2·base, 4·base, ...` capped at `max_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy allowing `max_retries` additional attempts
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Build the policy described by an extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.max_retries, config.base_delay(), config.max_delay())
    }

    /// Additional attempts allowed after the first
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `f` until it succeeds, fails non-transiently, or retries run out
    pub async fn run<F, Fut, T, E>(&self, operation: &str, mut f: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RemoteFailure,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!(operation, attempts = attempt, "Operation succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(e) if !e.is_transient() => {
                    warn!(operation, attempt, error = %e, "Non-retryable failure");
                    return Err(RetryError::Fatal(e));
                }
                Err(e) => {
                    if attempt > self.max_retries {
                        warn!(operation, attempts = attempt, error = %e, "Operation failed after max retries");
                        return Err(RetryError::Exhausted { attempts: attempt, last: e });
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}
