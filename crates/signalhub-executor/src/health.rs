//! Health classification derived from call metrics.

use crate::metrics::MetricsSummary;
use std::fmt;
use std::time::Duration;

/// Success rate (percent) below which a [`HealthIssue::LowSuccessRate`] is raised.
pub const MIN_SUCCESS_RATE: f64 = 95.0;

/// Average duration above which a [`HealthIssue::HighLatency`] is raised.
pub const MAX_AVERAGE_DURATION: Duration = Duration::from_millis(5000);

/// Overall health of the outbound-request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// No issues.
    Healthy,
    /// One or two issues; still serving.
    Degraded,
    /// More than two issues.
    Unhealthy,
}

impl HealthStatus {
    /// Maps an issue count to a status.
    pub fn from_issue_count(issues: usize) -> Self {
        match issues {
            0 => HealthStatus::Healthy,
            1 | 2 => HealthStatus::Degraded,
            _ => HealthStatus::Unhealthy,
        }
    }

    /// Healthy or Degraded.
    pub fn is_usable(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// One independent reason the layer is not fully healthy.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthIssue {
    /// Overall success rate under [`MIN_SUCCESS_RATE`].
    LowSuccessRate { rate: f64 },
    /// Average duration over [`MAX_AVERAGE_DURATION`].
    HighLatency { average: Duration },
    /// More than half of the most recent calls failed.
    RecentFailures { failed: usize, window: usize },
}

impl fmt::Display for HealthIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthIssue::LowSuccessRate { rate } => {
                write!(f, "low success rate: {rate:.1}%")
            }
            HealthIssue::HighLatency { average } => {
                write!(f, "high average response time: {}ms", average.as_millis())
            }
            HealthIssue::RecentFailures { failed, window } => {
                write!(f, "{failed} of the last {window} requests failed")
            }
        }
    }
}

/// Health status together with the issues that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub issues: Vec<HealthIssue>,
    /// Percentage of successful calls.
    pub success_rate: f64,
    pub average_duration: Duration,
}

impl HealthReport {
    /// Evaluates a summary against the fixed thresholds.
    pub fn evaluate(summary: &MetricsSummary) -> Self {
        let success_rate = summary.success_rate();
        let mut issues = Vec::new();

        if success_rate < MIN_SUCCESS_RATE {
            issues.push(HealthIssue::LowSuccessRate { rate: success_rate });
        }

        if summary.average_duration > MAX_AVERAGE_DURATION {
            issues.push(HealthIssue::HighLatency {
                average: summary.average_duration,
            });
        }

        let window = summary.recent.len();
        let failed = summary.recent.iter().filter(|m| !m.success).count();
        if window > 0 && failed * 2 > window {
            issues.push(HealthIssue::RecentFailures { failed, window });
        }

        Self {
            status: HealthStatus::from_issue_count(issues.len()),
            issues,
            success_rate,
            average_duration: summary.average_duration,
        }
    }
}
