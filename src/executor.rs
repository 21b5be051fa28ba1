use std::future::Future;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Default upper bound on attempts for a network operation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Runs fallible async operations with a fixed upper bound on attempts.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    max_attempts: u32,
    delay: Duration,
}

/// Last error seen once every attempt has failed.
#[derive(Debug)]
pub struct RetriesExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl RetryExecutor {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[instrument(skip(self, operation))]
    pub async fn execute<T, E, F, Fut>(
        &self,
        label: &str,
        mut operation: F,
    ) -> Result<T, RetriesExhausted<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            info!(attempt, "Starting {}", label);
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    warn!(attempt, error = %e, "Giving up on {}", label);
                    return Err(RetriesExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Attempt failed for {}", label);
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_secs(2))
    }
}
