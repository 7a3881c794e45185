use serde_json::{Value, json};
use signalhub_executor::{PerformanceMonitor, RequestExecutor, RequestOptions};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(start_paused = true)]
async fn measurements_aggregate_per_name() {
    let monitor = PerformanceMonitor::new();

    for millis in [10, 20, 30] {
        let measurement = monitor.start_measurement("render");
        tokio::time::advance(Duration::from_millis(millis)).await;
        measurement.stop();
    }
    monitor.record("query", Duration::from_millis(5));

    let stats = monitor.stats("render").unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.min, Duration::from_millis(10));
    assert_eq!(stats.max, Duration::from_millis(30));
    assert_eq!(stats.total, Duration::from_millis(60));
    assert_eq!(stats.average, Duration::from_millis(20));

    let all = monitor.all_stats();
    assert_eq!(all.keys().collect::<Vec<_>>(), ["query", "render"]);
    assert!(monitor.stats("unknown").is_none());
}

#[tokio::test]
async fn executor_feeds_the_monitor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(20)),
        )
        .mount(&server)
        .await;

    let monitor = PerformanceMonitor::new();
    let executor = RequestExecutor::builder()
        .performance_monitor(monitor.clone())
        .build();

    let _: Value = executor
        .execute(&server.uri(), RequestOptions::get(), "assistants.list")
        .await
        .unwrap();

    let stats = monitor.stats("assistants.list").unwrap();
    assert_eq!(stats.count, 1);
    assert!(stats.min >= Duration::from_millis(20));
}
