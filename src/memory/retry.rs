//! Exponential backoff for transient embedding failures.

use std::time::Duration;

use tracing::warn;

use crate::embedding::EmbeddingError;

/// How often and how patiently a failed embedding call is repeated.
///
/// Only `RateLimited` and `Unavailable` are retried. A provider supplied
/// `Retry-After` replaces the computed delay; if it is longer than
/// `max_backoff` the error is returned instead of waiting.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Computed delay before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(i32::MAX as u32) as i32);
        let millis = self.initial_backoff.as_millis() as f64 * factor;
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Run `op`, repeating it while it fails with a retryable error.
    pub fn run<T, F>(&self, mut op: F) -> Result<T, EmbeddingError>
    where
        F: FnMut() -> Result<T, EmbeddingError>,
    {
        let mut attempt = 0;
        loop {
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= self.max_retries || !err.is_retryable() {
                return Err(err);
            }

            let delay = match err.retry_after() {
                Some(requested) if requested > self.max_backoff => {
                    warn!(
                        retry_after_secs = requested.as_secs(),
                        max_backoff_secs = self.max_backoff.as_secs(),
                        "provider asked to wait longer than the backoff limit"
                    );
                    return Err(err);
                }
                Some(requested) => requested,
                None => self.backoff(attempt),
            };

            attempt += 1;
            warn!(
                attempt,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying embedding request"
            );
            std::thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn instant(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_backoff, Duration::from_millis(500));
        assert_eq!(policy.max_backoff, Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff(10), Duration::from_secs(30));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let result = instant(3).run(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(EmbeddingError::Unavailable("down".into()))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let calls = Cell::new(0);
        let result: Result<(), _> = instant(2).run(|| {
            calls.set(calls.get() + 1);
            Err(EmbeddingError::RateLimited { retry_after: None })
        });
        assert!(matches!(result, Err(EmbeddingError::RateLimited { .. })));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_permanent_errors_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = instant(5).run(|| {
            calls.set(calls.get() + 1);
            Err(EmbeddingError::Unauthorized("bad key".into()))
        });
        assert!(matches!(result, Err(EmbeddingError::Unauthorized(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_long_retry_after_surfaced() {
        let calls = Cell::new(0);
        let result: Result<(), _> = instant(5).run(|| {
            calls.set(calls.get() + 1);
            Err(EmbeddingError::RateLimited {
                retry_after: Some(Duration::from_secs(60)),
            })
        });
        assert_eq!(
            result.unwrap_err().retry_after(),
            Some(Duration::from_secs(60))
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_none_policy_single_attempt() {
        let calls = Cell::new(0);
        let result: Result<(), _> = RetryPolicy::none().run(|| {
            calls.set(calls.get() + 1);
            Err(EmbeddingError::Unavailable("down".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
