//! Bounded retry for transient store contention
//!
//! SQLite raises lock errors before a statement executes, so
//! re-issuing the same statement after a lock error cannot apply it
//! twice. Terminal errors (NotFound, validation, real query failures)
//! are returned immediately without retrying.

use crate::Result;
use std::time::{Duration, Instant};

/// Retry a store operation with exponential backoff until `max_wait_ms`
/// elapses.
///
/// Backoff starts at 10ms and doubles up to 1000ms per attempt. Only
/// errors classified transient by [`Error::is_transient`] are retried.
pub async fn retry_on_lock<F, Fut, T>(
    operation_name: &str,
    max_wait_ms: u64,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let start_time = Instant::now();
    let max_duration = Duration::from_millis(max_wait_ms);
    let mut attempt = 0u32;
    let mut backoff_ms = 10u64;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Store operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) if err.is_transient() => {
                let elapsed = start_time.elapsed();

                if elapsed >= max_duration {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = elapsed.as_millis() as u64,
                        max_wait_ms,
                        "Store operation failed: max retry time exceeded"
                    );
                    return Err(err);
                }

                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms,
                    "Store contention, will retry after backoff"
                );

                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms = (backoff_ms * 2).min(1000);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let result = retry_on_lock("test_op", 5000, || async { Ok::<i32, Error>(42) }).await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retries_transient_errors_until_success() {
        let mut attempts = 0;

        let result = retry_on_lock("test_op", 5000, || {
            attempts += 1;
            let fail = attempts < 3;
            async move {
                if fail {
                    Err(Error::Database(sqlx::Error::PoolTimedOut))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_wait() {
        let result = retry_on_lock("test_op", 50, || async {
            Err::<i32, Error>(Error::Database(sqlx::Error::PoolTimedOut))
        })
        .await;

        assert!(result.unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_terminal_error_fails_immediately() {
        let mut attempts = 0;

        let result = retry_on_lock("test_op", 5000, || {
            attempts += 1;
            async move { Err::<i32, Error>(Error::NotFound("clip 42".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(attempts, 1);
    }
}
