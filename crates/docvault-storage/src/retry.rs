//! Retry executor for remote mutations.
//!
//! The remote provider throttles bursts of requests. Every remote mutation
//! runs through a [`RetryExecutor`], which re-invokes the operation after a
//! delay while the failure classifies as transient and attempts remain.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use docvault_core::config::remote::{BackoffStrategy, RetryConfig};
use docvault_core::error::AppError;
use docvault_core::result::AppResult;

/// Whether a failure is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Fatal,
}

/// Default classification: only `RemoteTransient` is retried.
pub fn classify_remote(err: &AppError) -> ErrorClass {
    if err.is_transient() {
        ErrorClass::Transient
    } else {
        ErrorClass::Fatal
    }
}

/// Bounded retry with fixed or exponential delay.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    max_attempts: u32,
    base_delay: Duration,
    backoff: BackoffStrategy,
}

impl RetryExecutor {
    /// Fixed-delay executor. `max_attempts` counts the first call and is
    /// clamped to at least one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff: BackoffStrategy::Fixed,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.base_delay_ms))
            .with_backoff(config.backoff)
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after the `attempt`-th failure (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            BackoffStrategy::Fixed => self.base_delay,
            BackoffStrategy::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.base_delay.saturating_mul(factor)
            }
        }
    }

    /// Run `op` with [`classify_remote`].
    pub async fn run<T, F, Fut>(&self, operation: &str, op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        self.run_classified(operation, classify_remote, op).await
    }

    /// Run `op` until it succeeds, fails fatally, or attempts run out.
    ///
    /// The error of the last attempt is returned unchanged.
    pub async fn run_classified<T, E, F, Fut, C>(
        &self,
        operation: &str,
        classify: C,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> ErrorClass,
        E: std::fmt::Display,
    {
        let mut attempt = 1u32;
        loop {
            let err = match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(operation, attempt, "Remote operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if classify(&err) == ErrorClass::Fatal {
                return Err(err);
            }
            if attempt >= self.max_attempts {
                warn!(operation, attempts = attempt, error = %err, "Retry budget exhausted");
                return Err(err);
            }

            let delay = self.delay_after(attempt);
            warn!(
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Transient remote failure, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;
    use docvault_core::error::ErrorKind;

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_constant_transient_error_uses_every_attempt() {
        let executor = RetryExecutor::new(5, Duration::from_millis(5000));
        let calls = counter();
        let started = Instant::now();

        let result: AppResult<()> = executor
            .run("make_directory", || {
                let calls = Arc::clone(&calls);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(AppError::remote_transient(format!("throttled #{n}")))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(err.kind, ErrorKind::RemoteTransient);
        assert_eq!(err.message, "throttled #5");
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(20_000), "{waited:?}");
        assert!(waited < Duration::from_millis(21_000), "{waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried() {
        let executor = RetryExecutor::new(5, Duration::from_millis(5000));
        let calls = counter();
        let started = Instant::now();

        let result: AppResult<()> = executor
            .run("upload", || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AppError::remote_fatal("quota exceeded"))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::RemoteFatal);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let executor = RetryExecutor::new(5, Duration::from_millis(100));
        let calls = counter();

        let value = executor
            .run("upload", || {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AppError::remote_transient("429"))
                    } else {
                        Ok("N7")
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "N7");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_classifier_with_foreign_error_type() {
        let executor = RetryExecutor::new(3, Duration::from_millis(10));
        let calls = counter();

        let result: Result<(), String> = executor
            .run_classified(
                "probe",
                |e: &String| {
                    if e.starts_with("busy") {
                        ErrorClass::Transient
                    } else {
                        ErrorClass::Fatal
                    }
                },
                || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err("busy".to_string())
                    }
                },
            )
            .await;

        assert_eq!(result.unwrap_err(), "busy");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_exponential_delays_double() {
        let executor = RetryExecutor::new(5, Duration::from_millis(500))
            .with_backoff(BackoffStrategy::Exponential);
        let delays: Vec<u128> = (1..=4).map(|a| executor.delay_after(a).as_millis()).collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000]);

        let fixed = RetryExecutor::new(5, Duration::from_millis(500));
        assert_eq!(fixed.delay_after(4), Duration::from_millis(500));
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let executor = RetryExecutor::new(0, Duration::ZERO);
        assert_eq!(executor.max_attempts(), 1);
    }
}
