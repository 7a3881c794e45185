use serde_json::{Value, json};
use signalhub_cache::TtlCache;
use signalhub_fallback::{AssistantCall, FallbackClient};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": "success", "data": data}))
}

#[tokio::test]
async fn different_payloads_use_different_entries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"page_num": 1})))
        .respond_with(envelope(json!(["page-1"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"page_num": 2})))
        .respond_with(envelope(json!(["page-2"])))
        .expect(1)
        .mount(&server)
        .await;

    let cache: TtlCache<Value> = TtlCache::builder().build();
    let client = FallbackClient::builder()
        .access_token("t")
        .workspace_id("ws-1")
        .list_endpoint(server.uri())
        .cache(cache.clone())
        .build();

    for _ in 0..2 {
        assert_eq!(client.list_assistants(1, 10).await.unwrap(), json!(["page-1"]));
        assert_eq!(client.list_assistants(2, 10).await.unwrap(), json!(["page-2"]));
    }
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.invalidate_pattern("^assistants:list:"), 2);
}

#[tokio::test]
async fn chat_entries_expire_sooner_than_lists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"query": "hi"})))
        .respond_with(envelope(json!({"answer": "hello"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"page_size": 10})))
        .respond_with(envelope(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = FallbackClient::builder()
        .access_token("t")
        .list_endpoint(server.uri())
        .chat_endpoint(server.uri())
        .chat_ttl(Duration::from_millis(50))
        .list_ttl(Duration::from_secs(60))
        .build();

    client.chat("a-1", "hi", None).await.unwrap();
    client.list_assistants(1, 10).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    client.chat("a-1", "hi", None).await.unwrap();
    client.list_assistants(1, 10).await.unwrap();
}

#[tokio::test]
async fn chat_cache_is_keyed_by_assistant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(envelope(json!("ok")))
        .expect(2)
        .mount(&server)
        .await;

    let client = FallbackClient::builder()
        .access_token("t")
        .chat_endpoint(server.uri())
        .build();

    client.fetch(&AssistantCall::chat("a-1", "hi")).await.unwrap();
    client.fetch(&AssistantCall::chat("a-2", "hi")).await.unwrap();
    client.fetch(&AssistantCall::chat("a-1", "hi")).await.unwrap();

    assert_eq!(client.cache().invalidate_pattern("^assistants:chat:a-1:"), 1);
}
