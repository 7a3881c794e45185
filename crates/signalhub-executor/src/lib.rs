//! Retrying, timeout-aware HTTP request executor for signalhub.
//!
//! [`RequestExecutor::execute`] issues one logical call: every attempt races
//! a deadline and the caller's [`CancellationToken`], transient failures are
//! retried with exponential backoff, and one [`RequestMetric`] is recorded
//! for the whole call.
//!
//! # Retry policy
//!
//! - network errors and timeouts are retried
//! - `5xx` and `429` responses are retried unless
//!   [`retry_server_errors`](ExecutorConfigBuilder::retry_server_errors) is off
//! - other non-2xx responses fail immediately with `HTTP <status>: <reason>`
//! - a cancelled caller token ends the call, even during a backoff delay
//!
//! # Examples
//!
//! ```no_run
//! use signalhub_executor::{RequestExecutor, RequestOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = RequestExecutor::builder()
//!     .name("assistant-api")
//!     .timeout(Duration::from_secs(10))
//!     .max_retries(3)
//!     .build();
//!
//! let body: serde_json::Value = executor
//!     .execute("https://api.example.com/v1/items", RequestOptions::get(), "items")
//!     .await?;
//!
//! let health = executor.health_status();
//! println!("{:?} {:?}", health.status, body);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod events;
mod health;
mod metrics;
mod options;
mod perf;

pub use config::{ExecutorConfig, ExecutorConfigBuilder};
pub use error::RequestError;
pub use events::RequestEvent;
pub use health::{HealthIssue, HealthReport, HealthStatus};
pub use crate::metrics::{MetricsSummary, RequestMetric, RequestMetrics, RECENT_WINDOW};
pub use options::RequestOptions;
pub use perf::{Measurement, MeasurementStats, PerformanceMonitor};

pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;

use serde::de::DeserializeOwned;
use signalhub_core::Classify;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

#[cfg(feature = "metrics")]
use ::metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Issues HTTP calls with timeout, retry and per-call metrics.
///
/// Cloning is cheap; clones share the configuration, the HTTP connection
/// pool and the metrics log.
#[derive(Clone)]
pub struct RequestExecutor {
    client: reqwest::Client,
    config: Arc<ExecutorConfig>,
    metrics: Arc<RequestMetrics>,
    monitor: Option<PerformanceMonitor>,
}

impl RequestExecutor {
    /// Creates a builder.
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::new()
    }

    pub(crate) fn from_parts(
        client: reqwest::Client,
        config: ExecutorConfig,
        metrics: Arc<RequestMetrics>,
        monitor: Option<PerformanceMonitor>,
    ) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "signalhub_requests_total",
                "Total number of logical requests by outcome"
            );
            describe_counter!(
                "signalhub_request_retries_total",
                "Total number of retry attempts"
            );
            describe_histogram!(
                "signalhub_request_duration_seconds",
                "Duration of logical requests, retries included"
            );
        }

        Self {
            client,
            config: Arc::new(config),
            metrics,
            monitor,
        }
    }

    /// The executor's configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// The log every call is recorded into.
    pub fn metrics_log(&self) -> &Arc<RequestMetrics> {
        &self.metrics
    }

    /// The performance monitor calls are measured in, if any.
    pub fn performance_monitor(&self) -> Option<&PerformanceMonitor> {
        self.monitor.as_ref()
    }

    /// Aggregates over the retained call metrics.
    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    /// Health derived from the retained call metrics.
    pub fn health_status(&self) -> HealthReport {
        self.metrics.health()
    }

    /// Issues a request to `url` and decodes the JSON response body as `T`.
    ///
    /// An empty body decodes as JSON `null`. `label` names the call in
    /// metrics, events and the performance monitor.
    pub async fn execute<T>(
        &self,
        url: &str,
        options: RequestOptions,
        label: &str,
    ) -> Result<T, RequestError>
    where
        T: DeserializeOwned,
    {
        let measurement = self
            .monitor
            .as_ref()
            .map(|monitor| monitor.start_measurement(label));
        let started_at = SystemTime::now();
        let start = tokio::time::Instant::now();
        let timeout = options.timeout.unwrap_or(self.config.timeout);

        let mut attempts = 0;
        let result = loop {
            attempts += 1;
            let error = match self.attempt::<T>(url, &options, timeout).await {
                Ok(success) => break Ok(success),
                Err(error) => error,
            };

            if attempts >= self.config.max_retries
                || !error.is_retryable(self.config.retry_server_errors)
            {
                break Err(error);
            }

            let delay = self.config.backoff.delay(attempts);

            #[cfg(feature = "tracing")]
            warn!(
                executor = %self.config.name,
                label,
                url,
                attempt = attempts,
                ?delay,
                error = %error,
                "request attempt failed, retrying"
            );

            #[cfg(feature = "metrics")]
            counter!("signalhub_request_retries_total", "executor" => self.config.name.clone())
                .increment(1);

            self.config.event_listeners.emit(&RequestEvent::Retry {
                executor_name: self.config.name.clone(),
                timestamp: std::time::Instant::now(),
                label: label.to_string(),
                attempt: attempts,
                delay,
            });

            if !backoff(delay, options.cancel.as_ref()).await {
                break Err(RequestError::Cancelled {
                    url: url.to_string(),
                });
            }
        };

        let duration = start.elapsed();
        if let Some(measurement) = measurement {
            measurement.stop();
        }
        self.finish(url, &options, label, started_at, duration, attempts, &result);

        result.map(|(_, value)| value)
    }

    async fn attempt<T>(
        &self,
        url: &str,
        options: &RequestOptions,
        timeout: Duration,
    ) -> Result<(u16, T), RequestError>
    where
        T: DeserializeOwned,
    {
        let mut request = self.client.request(options.method.clone(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let call = async {
            let response = request
                .send()
                .await
                .map_err(|e| RequestError::from_transport(url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(RequestError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| RequestError::from_transport(url, e))?;
            let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
            let value = serde_json::from_slice(body).map_err(|source| RequestError::Decode {
                url: url.to_string(),
                source,
            })?;

            Ok((status.as_u16(), value))
        };

        let timed = async {
            tokio::time::timeout(timeout, call)
                .await
                .unwrap_or_else(|_| {
                    Err(RequestError::Timeout {
                        url: url.to_string(),
                        timeout,
                    })
                })
        };

        match &options.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(RequestError::Cancelled { url: url.to_string() }),
                result = timed => result,
            },
            None => timed.await,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish<T>(
        &self,
        url: &str,
        options: &RequestOptions,
        label: &str,
        started_at: SystemTime,
        duration: Duration,
        attempts: u32,
        result: &Result<(u16, T), RequestError>,
    ) {
        let (status, error) = match result {
            Ok((status, _)) => (Some(*status), None),
            Err(error) => (error.status(), Some(error.to_string())),
        };

        self.metrics.record(RequestMetric {
            url: url.to_string(),
            method: options.method.to_string(),
            label: label.to_string(),
            started_at,
            ended_at: SystemTime::now(),
            duration,
            status,
            success: result.is_ok(),
            error,
            attempts,
        });

        #[cfg(feature = "metrics")]
        {
            let outcome = if result.is_ok() { "success" } else { "failure" };
            counter!(
                "signalhub_requests_total",
                "executor" => self.config.name.clone(),
                "outcome" => outcome
            )
            .increment(1);
            histogram!(
                "signalhub_request_duration_seconds",
                "executor" => self.config.name.clone()
            )
            .record(duration.as_secs_f64());
        }

        let event = match result {
            Ok(_) => {
                #[cfg(feature = "tracing")]
                debug!(
                    executor = %self.config.name,
                    label,
                    url,
                    attempts,
                    ?duration,
                    "request succeeded"
                );

                RequestEvent::Success {
                    executor_name: self.config.name.clone(),
                    timestamp: std::time::Instant::now(),
                    label: label.to_string(),
                    attempts,
                    duration,
                }
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                warn!(
                    executor = %self.config.name,
                    label,
                    url,
                    attempts,
                    error = %error,
                    "request failed"
                );

                RequestEvent::Failure {
                    executor_name: self.config.name.clone(),
                    timestamp: std::time::Instant::now(),
                    label: label.to_string(),
                    attempts,
                    kind: error.kind(),
                }
            }
        };
        self.config.event_listeners.emit(&event);
    }
}

/// Sleeps for `delay`. Returns `false` if `cancel` fired first.
async fn backoff(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
    match cancel {
        Some(token) => tokio::select! {
            _ = token.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        },
        None => {
            tokio::time::sleep(delay).await;
            true
        }
    }
}
