use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Errors that can tell whether another attempt might succeed
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

/// Attempt budget and the fixed pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first (treated as at least 1)
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryConfig {
    /// Single attempt, no retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// HTTP statuses worth another attempt
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. Returns the last error.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && err.is_retryable() => {
                warn!(
                    call = label,
                    attempt,
                    max_attempts,
                    "Attempt failed, retrying in {:?}: {}",
                    config.delay,
                    err
                );
                tokio::time::sleep(config.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestError {
        retryable: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error (retryable: {})", self.retryable)
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            self.retryable
        }
    }

    #[tokio::test]
    async fn test_stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::fixed(3, Duration::ZERO);

        let result: Result<(), TestError> = with_retry(&config, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError { retryable: true })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::fixed(3, Duration::ZERO);

        let result: Result<(), TestError> = with_retry(&config, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError { retryable: false })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::fixed(3, Duration::from_millis(1));

        let result: Result<u32, TestError> = with_retry(&config, "test", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 2 {
                Err(TestError { retryable: true })
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::fixed(0, Duration::ZERO);

        let _: Result<(), TestError> = with_retry(&config, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError { retryable: true })
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(429));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(404));
    }
}
