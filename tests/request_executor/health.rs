use signalhub_executor::{HealthIssue, HealthStatus, RequestMetric, RequestMetrics};
use std::time::{Duration, SystemTime};

fn metric(success: bool, millis: u64) -> RequestMetric {
    let now = SystemTime::now();
    RequestMetric {
        url: "https://api.test/v1/assistants".into(),
        method: "POST".into(),
        label: "assistants.list".into(),
        started_at: now,
        ended_at: now,
        duration: Duration::from_millis(millis),
        status: Some(if success { 200 } else { 500 }),
        success,
        error: (!success).then(|| "HTTP 500: Internal Server Error".to_string()),
        attempts: 1,
    }
}

fn record(metrics: &RequestMetrics, outcomes: impl IntoIterator<Item = (bool, u64)>) {
    for (success, millis) in outcomes {
        metrics.record(metric(success, millis));
    }
}

#[test]
fn no_calls_is_healthy() {
    let metrics = RequestMetrics::default();
    let report = metrics.health();
    assert_eq!(report.status, HealthStatus::Healthy);
    assert!(report.issues.is_empty());
    assert_eq!(report.success_rate, 100.0);
}

#[test]
fn early_failures_only_lower_the_success_rate() {
    // 90% success, failures at the start, fast
    let metrics = RequestMetrics::new(100);
    record(&metrics, (0..2).map(|_| (false, 50)));
    record(&metrics, (0..18).map(|_| (true, 50)));

    let report = metrics.health();
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.issues.len(), 1);
    assert!(matches!(report.issues[0], HealthIssue::LowSuccessRate { .. }));
    assert!((report.success_rate - 90.0).abs() < f64::EPSILON);
}

#[test]
fn slow_and_failing_is_degraded_with_two_issues() {
    let metrics = RequestMetrics::new(100);
    record(&metrics, (0..2).map(|_| (false, 6000)));
    record(&metrics, (0..18).map(|_| (true, 6000)));

    let report = metrics.health();
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.issues.len(), 2);
    assert!(
        report
            .issues
            .iter()
            .any(|issue| matches!(issue, HealthIssue::HighLatency { .. }))
    );
}

#[test]
fn recent_failures_and_slow_is_unhealthy() {
    let metrics = RequestMetrics::new(100);
    record(&metrics, (0..14).map(|_| (true, 6000)));
    record(&metrics, (0..6).map(|_| (false, 6000)));

    let report = metrics.health();
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert_eq!(report.issues.len(), 3);
    assert!(report.issues.contains(&HealthIssue::RecentFailures {
        failed: 6,
        window: 10
    }));
    assert!(!report.status.is_usable());
}

#[test]
fn aggregates_cover_only_the_retained_window() {
    let metrics = RequestMetrics::new(10);
    record(&metrics, (0..10).map(|_| (false, 10)));
    record(&metrics, (0..10).map(|_| (true, 10)));

    let summary = metrics.summary();
    assert_eq!(metrics.len(), 10);
    assert_eq!(summary.total, 10);
    assert_eq!(summary.failed, 0);
    assert!(metrics.health().status.is_healthy());
}
