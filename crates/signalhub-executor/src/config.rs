//! Configuration for the request executor.

use crate::events::RequestEvent;
use crate::metrics::RequestMetrics;
use crate::perf::PerformanceMonitor;
use crate::RequestExecutor;
use signalhub_core::{ErrorKind, EventListener, EventListeners, ExponentialBackoff, FnListener};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a [`RequestExecutor`].
pub struct ExecutorConfig {
    pub(crate) name: String,
    pub(crate) timeout: Duration,
    pub(crate) max_retries: u32,
    pub(crate) backoff: ExponentialBackoff,
    pub(crate) retry_server_errors: bool,
    pub(crate) event_listeners: EventListeners<RequestEvent>,
}

impl ExecutorConfig {
    /// Default per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Maximum attempts per call, the first one included.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff between attempts.
    pub fn backoff(&self) -> ExponentialBackoff {
        self.backoff
    }
}

/// Builder for a [`RequestExecutor`].
pub struct ExecutorConfigBuilder {
    name: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    backoff_multiplier: f64,
    max_delay: Duration,
    retry_server_errors: bool,
    metrics_capacity: usize,
    metrics: Option<Arc<RequestMetrics>>,
    monitor: Option<PerformanceMonitor>,
    client: Option<reqwest::Client>,
    event_listeners: EventListeners<RequestEvent>,
}

impl ExecutorConfigBuilder {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - timeout: 30 seconds
    /// - max_retries: 3 (attempts, including the first)
    /// - retry_delay: 1 second, multiplied by 2.0 per retry, capped at 30 seconds
    /// - retry_server_errors: true
    /// - metrics_capacity: 1000
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            retry_server_errors: true,
            metrics_capacity: 1000,
            metrics: None,
            monitor: None,
            client: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name used in logs, metrics and events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the per-call timeout. Each attempt gets the full timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of attempts per call, the first one included.
    /// Zero is treated as one.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the factor the delay grows by on each further retry.
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Caps the delay between attempts.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Whether 5xx and 429 responses enter the retry loop.
    ///
    /// Other non-2xx statuses are never retried.
    pub fn retry_server_errors(mut self, retry: bool) -> Self {
        self.retry_server_errors = retry;
        self
    }

    /// Sets how many call metrics are retained.
    ///
    /// Ignored when [`metrics`](Self::metrics) supplies a log.
    pub fn metrics_capacity(mut self, capacity: usize) -> Self {
        self.metrics_capacity = capacity;
        self
    }

    /// Records call metrics into an existing log.
    pub fn metrics(mut self, metrics: Arc<RequestMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Also records each call's duration in `monitor`, under its label.
    pub fn performance_monitor(mut self, monitor: PerformanceMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Uses `client` instead of a default `reqwest::Client`.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Registers a listener for every executor event.
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<RequestEvent> + 'static,
    {
        self.event_listeners.add(listener);
        self
    }

    /// Called with the attempt number and delay before each retry.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RequestEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Called with the attempt count and total duration of each successful call.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RequestEvent::Success {
                attempts, duration, ..
            } = event
            {
                f(*attempts, *duration);
            }
        }));
        self
    }

    /// Called with the attempt count and error kind of each failed call.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, ErrorKind) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RequestEvent::Failure { attempts, kind, .. } = event {
                f(*attempts, *kind);
            }
        }));
        self
    }

    /// Builds the executor.
    pub fn build(self) -> RequestExecutor {
        let backoff = ExponentialBackoff::new(self.retry_delay)
            .multiplier(self.backoff_multiplier)
            .max_delay(self.max_delay);

        let config = ExecutorConfig {
            name: self.name,
            timeout: self.timeout,
            max_retries: self.max_retries.max(1),
            backoff,
            retry_server_errors: self.retry_server_errors,
            event_listeners: self.event_listeners,
        };

        let metrics = self
            .metrics
            .unwrap_or_else(|| Arc::new(RequestMetrics::new(self.metrics_capacity)));

        RequestExecutor::from_parts(
            self.client.unwrap_or_default(),
            config,
            metrics,
            self.monitor,
        )
    }
}

impl Default for ExecutorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
