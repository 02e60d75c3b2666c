//! Retry logic with exponential backoff
//!
//! This module provides opt-in retry logic for transient transport failures
//! during segment fetches. It implements exponential backoff with optional
//! jitter to prevent thundering herd.
//!
//! Retry is an extension of the baseline retrieval contract, not part of it:
//! the default [`RetryConfig`] is disabled, and even when enabled only
//! transport-level errors (timeouts, connection failures) are retried. A
//! clean HTTP non-success status is never retried because it is the
//! end-of-series signal itself.
//!
//! # Example
//!
//! ```no_run
//! use segment_dl::retry::{IsRetryable, fetch_with_retry};
//! use segment_dl::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//! # impl std::fmt::Display for MyError {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//! #         write!(f, "{self:?}")
//! #     }
//! # }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig {
//!     enabled: true,
//!     ..RetryConfig::default()
//! };
//! let result = fetch_with_retry(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, connection reset) should return
/// `true`. Permanent failures (bad configuration, disk full, tool missing)
/// should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Everything else is a configuration or tool problem that more
            // attempts cannot fix
            Error::Config { .. }
            | Error::InvalidBaseUrl { .. }
            | Error::MergeTool { .. }
            | Error::ToolNotFound { .. }
            | Error::NotSupported(_)
            | Error::Other(_) => false,
        }
    }
}

/// Raw client errors carry their own timeout/connect classification
impl IsRetryable for reqwest::Error {
    fn is_retryable(&self) -> bool {
        self.is_timeout() || self.is_connect()
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// When the configuration is disabled the operation runs exactly once and
/// its result is returned as-is, preserving the baseline no-retry contract.
///
/// `max_attempts` counts every call including the first, so a value of 3
/// allows at most 2 retries.
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays, backoff multiplier, jitter)
/// * `operation` - Async closure that returns Result<T, E> where E implements IsRetryable
///
/// # Returns
///
/// Returns the successful result or the last error after all retry attempts
/// are exhausted.
pub async fn fetch_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    if !config.enabled {
        return operation().await;
    }

    let mut attempt = 1;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "operation failed, retrying"
                );

                let jittered_delay = if config.jitter { add_jitter(delay) } else { delay };

                tokio::time::sleep(jittered_delay).await;

                // Next delay grows exponentially, capped at max_delay. The
                // fallible conversion covers multipliers large enough to
                // overflow a Duration; they saturate at the cap.
                let next_delay =
                    Duration::try_from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier)
                        .unwrap_or(config.max_delay);
                delay = next_delay.min(config.max_delay);
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(
                        error = %e,
                        attempts = attempt,
                        "operation failed after all retry attempts exhausted"
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// actual delay falls between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn enabled_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            enabled: true,
            max_attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn success_does_not_retry() {
        let config = enabled_config(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn disabled_config_attempts_exactly_once() {
        let config = RetryConfig {
            enabled: false,
            ..enabled_config(5)
        };
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(
            counter.load(Ordering::SeqCst),
            1,
            "disabled retry must preserve the single-attempt baseline"
        );
    }

    #[tokio::test]
    async fn transient_error_retries_then_succeeds() {
        let config = enabled_config(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "should retry twice before success"
        );
    }

    #[tokio::test]
    async fn exhausted_attempts_return_last_error() {
        let config = enabled_config(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "max_attempts counts the first call, so 3 attempts total"
        );
    }

    #[tokio::test]
    async fn permanent_error_does_not_retry() {
        let config = enabled_config(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Permanent)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(
            counter.load(Ordering::SeqCst),
            1,
            "should not retry permanent error"
        );
    }

    #[tokio::test]
    async fn overflowing_backoff_saturates_at_max_delay() {
        // A multiplier this large overflows Duration on the first growth
        // step; the delay must clamp to max_delay instead of panicking.
        let config = RetryConfig {
            backoff_multiplier: 1e300,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            ..enabled_config(3)
        };

        let result = fetch_with_retry(&config, || async { Err::<i32, _>(TestError::Transient) })
            .await;

        assert!(result.is_err(), "attempts must exhaust without panicking");
    }

    #[tokio::test]
    async fn backoff_delays_grow_between_attempts() {
        let config = enabled_config(3);

        let start = std::time::Instant::now();
        let result = fetch_with_retry(&config, || async { Err::<i32, _>(TestError::Transient) })
            .await;
        let elapsed = start.elapsed();

        assert!(result.is_err());
        // Delays: 10ms then 20ms. Allow generous slack for slow CI.
        assert!(
            elapsed >= Duration::from_millis(30),
            "expected at least 30ms of backoff, got {elapsed:?}"
        );
    }

    // --- Error classification ---

    #[test]
    fn io_timeout_is_retryable() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow"));
        assert!(err.is_retryable());
    }

    #[test]
    fn config_and_tool_errors_are_not_retryable() {
        let config_err = Error::Config {
            message: "bad".into(),
            key: None,
        };
        let tool_err = Error::ToolNotFound {
            tool: "ffmpeg".into(),
        };
        assert!(!config_err.is_retryable());
        assert!(
            !tool_err.is_retryable(),
            "a missing binary will not appear by retrying"
        );
    }
}
