use serde_json::{Value, json};
use signalhub_core::{Classify, ErrorKind};
use signalhub_executor::{HealthStatus, RequestError, RequestExecutor, RequestOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor() -> RequestExecutor {
    RequestExecutor::builder()
        .name("test")
        .retry_delay(Duration::from_millis(20))
        .timeout(Duration::from_secs(5))
        .build()
}

#[tokio::test]
async fn transient_server_error_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
        .mount(&server)
        .await;

    let executor = executor();
    let body: Value = executor
        .execute(&server.uri(), RequestOptions::get(), "recover")
        .await
        .unwrap();

    assert_eq!(body, json!({"ok": 1}));
    let summary = executor.metrics();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.recent[0].attempts, 2);
    assert!(summary.recent[0].success);
}

#[tokio::test]
async fn rate_limited_is_retried_client_error_is_not() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let executor = executor();
    let err = executor
        .execute::<Value>(&server.uri(), RequestOptions::get(), "limited")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.to_string(), "HTTP 429: Too Many Requests");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    let err = executor
        .execute::<Value>(&server.uri(), RequestOptions::get(), "unauthorized")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
}

#[tokio::test]
async fn backoff_grows_between_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let delays = Arc::new(std::sync::Mutex::new(Vec::new()));
    let d = Arc::clone(&delays);
    let executor = RequestExecutor::builder()
        .max_retries(4)
        .retry_delay(Duration::from_millis(10))
        .backoff_multiplier(2.0)
        .max_delay(Duration::from_millis(30))
        .on_retry(move |_, delay| d.lock().unwrap().push(delay))
        .build();

    let start = Instant::now();
    let _ = executor
        .execute::<Value>(&server.uri(), RequestOptions::get(), "backoff")
        .await;

    assert_eq!(
        *delays.lock().unwrap(),
        vec![
            Duration::from_millis(10),
            Duration::from_millis(20),
            Duration::from_millis(30),
        ]
    );
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn failures_show_up_in_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let failures = Arc::new(AtomicU32::new(0));
    let f = Arc::clone(&failures);
    let executor = RequestExecutor::builder()
        .on_failure(move |_, _| {
            f.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    for _ in 0..6 {
        let result = executor
            .execute::<Value>(&server.uri(), RequestOptions::get(), "missing")
            .await;
        assert!(matches!(result, Err(RequestError::Status { status: 404, .. })));
    }

    let report = executor.health_status();
    assert_eq!(failures.load(Ordering::SeqCst), 6);
    assert_eq!(report.success_rate, 0.0);
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.issues.len(), 2);
}
