//! Bounded retry with capped exponential backoff. Applied to the single
//! upstream attempt only; the circuit breaker wraps the whole retried call
//! so one logical call counts once in its window.

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;

/// Delay before retry number `attempt` (1-based): base doubled per retry,
/// capped at the configured maximum.
fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
    let delay_ms = config
        .backoff_base_ms
        .saturating_mul(exponent)
        .min(config.backoff_max_ms);
    Duration::from_millis(delay_ms)
}

/// Run `op` up to `config.max_attempts` times, sleeping between attempts.
/// Only errors for which `is_transient` returns true are retried; a
/// definitive answer is returned immediately.
pub async fn with_retry<T, E, F, Fut>(
    config: &RetryConfig,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < config.max_attempts && is_transient(&err) => {
                tokio::time::sleep(backoff_delay(config, attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            backoff_base_ms: 1,
            backoff_max_ms: 4,
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let config = RetryConfig {
            max_attempts: 5,
            backoff_base_ms: 100,
            backoff_max_ms: 2_000,
        };

        assert_eq!(backoff_delay(&config, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(&config, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(&config, 5), Duration::from_millis(1_600));
        assert_eq!(backoff_delay(&config, 6), Duration::from_millis(2_000));
    }

    #[tokio::test]
    async fn recovers_from_transient_failures() {
        let attempts = AtomicU32::new(0);

        let result = with_retry(
            &fast_retry(3),
            CatalogError::is_transient,
            || async {
                match attempts.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err(CatalogError::Upstream { status: 503 }),
                    _ => Ok("ok"),
                }
            },
        )
        .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(
            &fast_retry(3),
            CatalogError::is_transient,
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CatalogError::Upstream { status: 500 })
            },
        )
        .await;

        assert_eq!(result, Err(CatalogError::Upstream { status: 500 }));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_a_definitive_answer() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(
            &fast_retry(3),
            CatalogError::is_transient,
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CatalogError::NotFound)
            },
        )
        .await;

        assert_eq!(result, Err(CatalogError::NotFound));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
