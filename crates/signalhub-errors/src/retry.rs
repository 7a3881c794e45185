//! Transport-agnostic retry wrapper.

use signalhub_core::{Classify, ExponentialBackoff};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Retry settings for [`with_retry`].
pub struct RetryConfig<E> {
    pub(crate) max_retries: u32,
    pub(crate) backoff: ExponentialBackoff,
    pub(crate) retry_on: RetryPredicate<E>,
}

impl<E> Clone for RetryConfig<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            backoff: self.backoff,
            retry_on: Arc::clone(&self.retry_on),
        }
    }
}

impl<E: Classify + 'static> RetryConfig<E> {
    /// Creates a builder whose default condition retries transient errors
    /// (network, timeout, cancellation).
    pub fn builder() -> RetryConfigBuilder<E> {
        RetryConfigBuilder::new()
    }
}

impl<E> RetryConfig<E> {
    /// Total attempts, the first one included.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }

    /// Whether `error` should be retried.
    pub fn should_retry(&self, error: &E) -> bool {
        (self.retry_on)(error)
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder<E> {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    retry_on: RetryPredicate<E>,
}

impl<E: Classify + 'static> RetryConfigBuilder<E> {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - max_retries: 3 (attempts, including the first)
    /// - initial_delay: 1 second
    /// - backoff_multiplier: 2.0
    /// - max_delay: 10 seconds
    /// - retry_on: [`ErrorKind::is_transient`](signalhub_core::ErrorKind::is_transient)
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            retry_on: Arc::new(|e: &E| e.kind().is_transient()),
        }
    }
}

impl<E: Classify + 'static> Default for RetryConfigBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryConfigBuilder<E> {
    /// Sets the total number of attempts. Zero is treated as one.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Caps the delay between attempts.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the factor the delay grows by on each further retry.
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Replaces the retry condition.
    pub fn retry_on<F>(mut self, f: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_on = Arc::new(f);
        self
    }

    pub fn build(self) -> RetryConfig<E> {
        RetryConfig {
            max_retries: self.max_retries.max(1),
            backoff: ExponentialBackoff::new(self.initial_delay)
                .multiplier(self.backoff_multiplier)
                .max_delay(self.max_delay),
            retry_on: self.retry_on,
        }
    }
}

/// Runs `op` until it succeeds, its error fails the retry condition, or
/// `config.max_retries` attempts have been made.
///
/// Retry `n` waits `min(initial_delay * multiplier^(n-1), max_delay)`. The
/// last error is returned unchanged.
///
/// # Examples
///
/// ```
/// use signalhub_errors::{with_retry, RetryConfig};
/// use std::io;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = RetryConfig::<io::Error>::builder()
///     .max_retries(2)
///     .initial_delay(Duration::from_millis(1))
///     .build();
///
/// let result = with_retry(
///     || async { Err::<(), _>(io::Error::new(io::ErrorKind::ConnectionReset, "reset")) },
///     &config,
/// )
/// .await;
/// assert!(result.is_err());
/// # }
/// ```
pub async fn with_retry<F, Fut, T, E>(mut op: F, config: &RetryConfig<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if attempt >= config.max_retries || !config.should_retry(&error) {
            return Err(error);
        }

        let delay = config.delay(attempt);

        #[cfg(feature = "tracing")]
        debug!(attempt, ?delay, "operation failed, retrying");

        tokio::time::sleep(delay).await;
    }
}
