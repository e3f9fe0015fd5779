//! Retry policy with exponential backoff.
//!
//! The adapter never retries on its own; callers decide, per operation,
//! whether a failure may be retried by passing the operation's idempotency.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};
use crate::domain::models::RetryConfig;

/// Retry policy configuration for handling transient errors
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }
}

impl RetryPolicy {
    /// Create a new retry policy. `max_backoff_ms` is raised to
    /// `initial_backoff_ms` if it is smaller.
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Execute an operation with exponential backoff retry logic
    ///
    /// `idempotent` states whether repeating the operation is safe; it is
    /// passed to [`TaskManagerError::is_retryable`] for every failure.
    pub async fn execute<F, Fut, T>(
        &self,
        idempotent: bool,
        mut operation: F,
    ) -> TaskManagerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TaskManagerResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retrying");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if self.should_retry(&err, idempotent, attempt) {
                        let backoff = self.calculate_backoff(attempt);
                        warn!(
                            attempt = attempt + 1,
                            backoff_ms = backoff.as_millis() as u64,
                            error = %err,
                            "transient failure, retrying"
                        );

                        sleep(backoff).await;
                        attempt += 1;
                    } else {
                        if attempt > 0 {
                            warn!(attempts = attempt + 1, error = %err, "giving up");
                        }
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Formula: min(initial_backoff * 2^attempt, max_backoff)
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &TaskManagerError, idempotent: bool, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_retryable(idempotent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 100, 350);
        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(200));
        assert_eq!(policy.calculate_backoff(2), Duration::from_millis(350));
        assert_eq!(policy.calculate_backoff(30), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_retries_transport_errors_until_success() {
        let policy = RetryPolicy::new(3, 1, 2);
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(false, || {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(TaskManagerError::transport("connection reset"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_non_idempotent_server_errors() {
        let policy = RetryPolicy::new(3, 1, 2);
        let calls = Arc::new(AtomicU32::new(0));

        let result: TaskManagerResult<()> = policy
            .execute(false, || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TaskManagerError::RemoteWriteError {
                        status: 502,
                        body: "Bad Gateway".to_string(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(2, 1, 2);
        let calls = Arc::new(AtomicU32::new(0));

        let result: TaskManagerResult<()> = policy
            .execute(true, || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TaskManagerError::RemoteWriteError {
                        status: 503,
                        body: String::new(),
                    })
                }
            })
            .await;

        assert!(matches!(
            result,
            Err(TaskManagerError::RemoteWriteError { status: 503, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_none_policy_runs_once() {
        let policy = RetryPolicy::none();
        let calls = Arc::new(AtomicU32::new(0));
        let result: TaskManagerResult<()> = policy
            .execute(true, || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TaskManagerError::transport("timeout"))
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
