//! Per-call metrics kept in a fixed-capacity ring buffer.

use crate::health::HealthReport;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

/// Number of calls reported in [`MetricsSummary::recent`].
pub const RECENT_WINDOW: usize = 10;

/// Outcome of one logical call, covering all of its retry attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMetric {
    /// Target address.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Caller-supplied label.
    pub label: String,
    /// Wall-clock start of the first attempt.
    pub started_at: SystemTime,
    /// Wall-clock end of the last attempt.
    pub ended_at: SystemTime,
    /// Total time spent, backoff included.
    pub duration: Duration,
    /// Status of the last response, if one arrived.
    pub status: Option<u16>,
    /// Whether the call succeeded.
    pub success: bool,
    /// Message of the final error, if the call failed.
    pub error: Option<String>,
    /// Attempts made.
    pub attempts: u32,
}

/// Aggregate view over the retained metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Mean duration, zero when nothing is recorded.
    pub average_duration: Duration,
    pub slowest: Option<RequestMetric>,
    pub fastest: Option<RequestMetric>,
    /// Up to [`RECENT_WINDOW`] most recent calls, oldest first.
    pub recent: Vec<RequestMetric>,
}

impl MetricsSummary {
    /// Percentage of successful calls; 100.0 when nothing is recorded.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }
}

/// Bounded log of [`RequestMetric`]s. The oldest metric is dropped once
/// `capacity` is reached, so aggregates describe the most recent calls.
#[derive(Debug)]
pub struct RequestMetrics {
    entries: Mutex<VecDeque<RequestMetric>>,
    capacity: usize,
}

impl RequestMetrics {
    /// Creates an empty log holding at most `capacity` metrics (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends a metric, dropping the oldest one if the log is full.
    pub fn record(&self, metric: RequestMetric) {
        let mut entries = self.entries();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(metric);
    }

    /// Aggregates over every retained metric.
    pub fn summary(&self) -> MetricsSummary {
        let entries = self.entries();
        if entries.is_empty() {
            return MetricsSummary::default();
        }

        let total = entries.len();
        let successful = entries.iter().filter(|m| m.success).count();
        let sum: Duration = entries.iter().map(|m| m.duration).sum();
        let divisor = u32::try_from(total).unwrap_or(u32::MAX);

        MetricsSummary {
            total,
            successful,
            failed: total - successful,
            average_duration: sum / divisor,
            slowest: entries.iter().max_by_key(|m| m.duration).cloned(),
            fastest: entries.iter().min_by_key(|m| m.duration).cloned(),
            recent: entries
                .iter()
                .skip(total.saturating_sub(RECENT_WINDOW))
                .cloned()
                .collect(),
        }
    }

    /// Health derived from [`summary`](Self::summary).
    pub fn health(&self) -> HealthReport {
        HealthReport::evaluate(&self.summary())
    }

    /// Number of retained metrics.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained metrics.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every retained metric.
    pub fn clear(&self) {
        self.entries().clear();
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<RequestMetric>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new(1000)
    }
}
