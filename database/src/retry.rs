//! Bounded retry with exponential backoff for storage operations.
//!
//! The resilience policy lives here, behind the registry interface, so the
//! analytics layer never sees a retry. Only errors classified retryable by
//! [`ErrorExt::is_retryable`] are attempted again; permanent errors propagate
//! on first failure, unwrapped.

use platewatch_core::{CoreError, ErrorExt};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay between attempts (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    /// Retry config tuned for a local SQLite file: lock contention clears
    /// quickly, so delays start short.
    pub fn sqlite() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 50,
            max_delay_ms: 1000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

/// Calculate delay with exponential backoff and jitter
pub fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let exponential_delay = if attempt == 0 {
        Duration::from_millis(config.base_delay_ms)
    } else {
        let multiplier = config.backoff_multiplier.powi(attempt as i32);
        let delay_ms = (config.base_delay_ms as f64 * multiplier) as u64;
        Duration::from_millis(delay_ms.min(config.max_delay_ms))
    };

    let jitter_range = (exponential_delay.as_millis() as f64 * config.jitter_factor) as u64;
    let jitter = fastrand::u64(0..=jitter_range);
    let final_delay = exponential_delay + Duration::from_millis(jitter);

    final_delay.min(Duration::from_millis(config.max_delay_ms))
}

/// Retry executor that wraps storage operations with retry logic
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an operation, retrying retryable failures up to the configured
    /// bound. The last error is returned as-is so callers see the real
    /// upstream failure, not a retry wrapper.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(
                            "Operation {} succeeded after {} retries",
                            operation_name, attempt
                        );
                    }
                    return Ok(result);
                }
                Err(error) => {
                    attempt += 1;
                    if !error.is_retryable() {
                        debug!(
                            "Not retrying {} due to error type: {}",
                            operation_name, error
                        );
                        return Err(error);
                    }
                    if attempt >= self.config.max_attempts {
                        warn!(
                            "Operation {} failed after {} attempts: {}",
                            operation_name, attempt, error
                        );
                        return Err(error);
                    }
                    let delay = calculate_delay(attempt - 1, &self.config);
                    info!("Retrying {} in {:?} due to: {}", operation_name, delay, error);
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platewatch_core::{RegistryError, StoreError};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay_ms, 100);
        assert!(config.jitter_factor <= 1.0);
    }

    #[test]
    fn test_exponential_backoff_calculation() {
        let config = RetryConfig {
            base_delay_ms: 100,
            max_delay_ms: 1000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0, // No jitter for predictable test
            ..Default::default()
        };

        assert_eq!(calculate_delay(0, &config), Duration::from_millis(100));
        assert_eq!(calculate_delay(1, &config), Duration::from_millis(200));
        assert_eq!(calculate_delay(2, &config), Duration::from_millis(400));

        // Should cap at max_delay_ms
        assert_eq!(calculate_delay(10, &config), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let executor = RetryExecutor::new(RetryConfig::default());

        let result = executor
            .execute("test_operation", || async { Ok::<i32, CoreError>(42) })
            .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_success_after_retries() {
        let config = RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1, // Very short delay for test
            ..Default::default()
        };
        let executor = RetryExecutor::new(config);

        let attempt_count = Arc::new(Mutex::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result = executor
            .execute("test_operation", move || {
                let attempt_count = attempt_count_clone.clone();
                async move {
                    let mut count = attempt_count.lock().unwrap();
                    *count += 1;
                    if *count < 3 {
                        Err(CoreError::Registry(RegistryError::DatabaseLocked))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(*attempt_count.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_permanent_error() {
        let executor = RetryExecutor::new(RetryConfig::default());

        let attempt_count = Arc::new(Mutex::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result = executor
            .execute("test_operation", move || {
                let attempt_count = attempt_count_clone.clone();
                async move {
                    let mut count = attempt_count.lock().unwrap();
                    *count += 1;
                    Err::<i32, CoreError>(CoreError::Registry(RegistryError::InvalidHandle {
                        handle: "".to_string(),
                    }))
                }
            })
            .await;

        assert!(result.is_err());
        // Permanent errors are attempted exactly once
        assert_eq!(*attempt_count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_retry_bound_is_respected() {
        let config = RetryConfig {
            max_attempts: 4,
            base_delay_ms: 1,
            ..Default::default()
        };
        let executor = RetryExecutor::new(config);

        let attempt_count = Arc::new(Mutex::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result = executor
            .execute("test_operation", move || {
                let attempt_count = attempt_count_clone.clone();
                async move {
                    *attempt_count.lock().unwrap() += 1;
                    Err::<i32, CoreError>(
                        StoreError::Unavailable {
                            reason: "down".to_string(),
                        }
                        .into(),
                    )
                }
            })
            .await;

        // The original error surfaces, not a wrapper
        assert!(matches!(result, Err(CoreError::Store(_))));
        assert_eq!(*attempt_count.lock().unwrap(), 4);
    }
}
