use serde_json::{Value, json};
use signalhub_core::{Classify, ErrorKind};
use signalhub_executor::RequestExecutor;
use signalhub_fallback::{FallbackClient, FallbackError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": "success", "data": data}))
}

fn executor() -> RequestExecutor {
    RequestExecutor::builder()
        .max_retries(1)
        .timeout(Duration::from_millis(500))
        .build()
}

#[tokio::test]
async fn second_endpoint_answers_and_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/primary/list"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/alias/list"))
        .and(query_param("access_token", "token-1"))
        .respond_with(envelope(json!({"assistants": [{"id": "a-1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let tried = Arc::new(Mutex::new(Vec::new()));
    let t = Arc::clone(&tried);
    let client = FallbackClient::builder()
        .access_token("token-1")
        .workspace_id("ws-1")
        .list_endpoint(format!("{}/primary/list", server.uri()))
        .list_endpoint(format!("{}/alias/list", server.uri()))
        .executor(executor())
        .on_endpoint_failed(move |endpoint, _| t.lock().unwrap().push(endpoint.to_string()))
        .build();

    let first = client.list_assistants(1, 20).await.unwrap();
    assert_eq!(first, json!({"assistants": [{"id": "a-1"}]}));
    assert_eq!(tried.lock().unwrap().len(), 1);
    assert!(tried.lock().unwrap()[0].ends_with("/primary/list"));

    // served from the cache: the mocks' expectations would fail on a second request
    let second = client.list_assistants(1, 20).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(client.executor().metrics().total, 2);
}

#[tokio::test]
async fn timeout_on_primary_falls_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slow"))
        .respond_with(envelope(json!(1)).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/fast"))
        .respond_with(envelope(json!(2)))
        .mount(&server)
        .await;

    let kinds = Arc::new(Mutex::new(Vec::new()));
    let k = Arc::clone(&kinds);
    let client = FallbackClient::builder()
        .access_token("t")
        .chat_endpoint(format!("{}/slow", server.uri()))
        .chat_endpoint(format!("{}/fast", server.uri()))
        .executor(executor())
        .on_endpoint_failed(move |_, kind| k.lock().unwrap().push(kind))
        .build();

    assert_eq!(client.chat("a-1", "hi", None).await.unwrap(), json!(2));
    assert_eq!(*kinds.lock().unwrap(), vec![ErrorKind::Timeout]);
}

#[tokio::test]
async fn all_endpoints_failing_returns_the_last_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/one"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = FallbackClient::builder()
        .access_token("t")
        .list_endpoint(format!("{}/one", server.uri()))
        .list_endpoint(format!("{}/two", server.uri()))
        .executor(executor())
        .build();

    let err = client.list_assistants(1, 20).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 404: Not Found");
    assert!(matches!(err, FallbackError::Request(_)));
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn envelope_error_moves_to_next_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/one"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 1001, "msg": "bad space"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/two"))
        .respond_with(envelope(json!([1])))
        .expect(1)
        .mount(&server)
        .await;

    let client = FallbackClient::builder()
        .access_token("t")
        .list_endpoint(format!("{}/one", server.uri()))
        .list_endpoint(format!("{}/two", server.uri()))
        .executor(executor())
        .build();

    let data = client.list_assistants(1, 10).await.unwrap();
    assert_eq!(data, json!([1]));
}

#[tokio::test]
async fn last_envelope_error_surfaces_after_every_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/one"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 1001, "msg": "bad space"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/two"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 1002, "msg": "rate limited"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = FallbackClient::builder()
        .access_token("t")
        .chat_endpoint(format!("{}/one", server.uri()))
        .chat_endpoint(format!("{}/two", server.uri()))
        .executor(executor())
        .build();

    let err = client.chat("a-1", "hi", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Envelope);
    match err {
        FallbackError::Envelope {
            endpoint,
            code,
            message,
        } => {
            assert_eq!(endpoint, format!("{}/two", server.uri()));
            assert_eq!(code, 1002);
            assert_eq!(message, "rate limited");
        }
        other => panic!("unexpected error: {other}"),
    }
}
