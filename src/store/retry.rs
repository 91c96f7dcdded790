use crate::errors::{ExplorerError, ExplorerResult};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Bounded exponential backoff for transient store failures.
///
/// Only errors that report themselves retryable (store unavailability) are
/// retried; everything else is returned on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        let base = base_delay_ms.max(1);
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: base,
            max_delay_ms: max_delay_ms.max(base),
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self::new(1, 1, 1)
    }

    fn next_delay(&self, attempt: usize) -> Duration {
        let exp = 2_u64.saturating_pow(attempt as u32);
        let delay = self.base_delay_ms.saturating_mul(exp).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }

    /// Run `op` until it succeeds, fails for good, or `cancel` fires during a
    /// backoff wait
    pub async fn retry_async<F, Fut, T>(
        &self,
        cancel: &CancellationToken,
        mut op: F,
    ) -> ExplorerResult<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: std::future::Future<Output = ExplorerResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if !err.is_retryable() || attempt >= self.max_attempts {
                        return Err(err);
                    }
                    tokio::select! {
                        _ = sleep(self.next_delay(attempt - 1)) => {}
                        _ = cancel.cancelled() => {
                            return Err(ExplorerError::Cancelled { operation: "retry backoff" });
                        }
                    }
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 100, 1_000)
    }
}
