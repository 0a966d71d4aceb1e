//! Retry handler for node requests that may fail temporarily

use std::future::Future;
use tokio::time::{sleep, Duration};

use crate::utils::logging;

/// Retries an operation a fixed number of times with a flat delay
#[derive(Debug, Clone)]
pub struct RetryHandler {
    max_attempts: u32,
    delay_ms: u64,
}

impl RetryHandler {
    pub fn with_config(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay_ms,
        }
    }

    /// Execute an operation, logging each failed attempt
    pub async fn execute_with_retry_and_logging<F, Fut, T, E>(
        &self,
        operation: F,
        operation_name: &str,
        endpoint: &str,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        logging::log_info(&format!(
                            "[{}] {} succeeded after {} retries",
                            endpoint, operation_name, attempt
                        ));
                    }
                    return Ok(result);
                }
                Err(e) => {
                    attempt += 1;

                    if attempt >= self.max_attempts {
                        logging::log_error(&format!(
                            "[{}] {} failed after {} attempts: {}",
                            endpoint, operation_name, self.max_attempts, e
                        ));
                        return Err(e);
                    }

                    logging::log_warning(&format!(
                        "[{}] {} failed (attempt {}/{}): {}. Retrying in {}ms",
                        endpoint, operation_name, attempt, self.max_attempts, e, self.delay_ms
                    ));

                    sleep(Duration::from_millis(self.delay_ms)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let handler = RetryHandler::with_config(3, 0);

        let result: Result<u32, String> = handler
            .execute_with_retry_and_logging(
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(format!("attempt {}", n))
                    } else {
                        Ok(n)
                    }
                },
                "fetch",
                "ws://test",
            )
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let handler = RetryHandler::with_config(2, 0);

        let result: Result<(), String> = handler
            .execute_with_retry_and_logging(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("down".to_string())
                },
                "fetch",
                "ws://test",
            )
            .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
