//! Multi-endpoint fallback client for the AI-assistant API.
//!
//! [`FallbackClient`] serves each [`AssistantCall`] from the shared cache
//! when it can. Otherwise it tries the operation's endpoints in order
//! through the [`RequestExecutor`], validates the `{ code, msg, data }`
//! envelope of the first response that arrives and caches its payload.
//!
//! - Cache keys are the SHA-256 of the canonical request payload, so
//!   identical calls share an entry.
//! - Transport, HTTP and envelope failures move on to the next endpoint.
//!   Once every endpoint has failed, the last failure is returned.
//! - A missing access token fails before any network access.
//!
//! The client is also a Tower [`Service`] over [`AssistantCall`], so it can be
//! wrapped in further middleware.
//!
//! # Examples
//!
//! ```no_run
//! use signalhub_fallback::{AssistantCall, FallbackClient};
//!
//! # async fn example() -> Result<(), signalhub_fallback::FallbackError> {
//! let client = FallbackClient::builder()
//!     .name("assistants")
//!     .access_token("token")
//!     .workspace_id("ws-1")
//!     .list_endpoint("https://api.example.com/v1/assistants/list")
//!     .list_endpoint("https://api-backup.example.com/v1/assistants/list")
//!     .build();
//!
//! let page = client.list_assistants(1, 20).await?;
//! let reply = client
//!     .fetch(&AssistantCall::chat("assistant-1", "What changed this week?"))
//!     .await?;
//! println!("{page} {reply}");
//! # Ok(())
//! # }
//! ```

mod call;
mod config;
mod envelope;
mod error;
mod events;
mod generative;

pub use call::{AssistantCall, Operation};
pub use config::{AssistantApiConfig, AssistantApiConfigBuilder};
pub use envelope::{Envelope, SUCCESS_CODE};
pub use error::FallbackError;
pub use events::FallbackEvent;
pub use generative::{GenerativeClient, GenerativeConfigBuilder, GenerativeError};

use futures::future::BoxFuture;
use serde_json::Value;
use signalhub_cache::TtlCache;
use signalhub_core::Classify;
use signalhub_executor::{RequestExecutor, RequestOptions};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::Service;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Client for the assistant API with per-operation endpoint fallback.
///
/// Cloning is cheap; clones share the configuration, cache and executor.
#[derive(Clone)]
pub struct FallbackClient {
    config: Arc<AssistantApiConfig>,
    cache: TtlCache<Value>,
    executor: RequestExecutor,
}

impl FallbackClient {
    /// Creates a builder.
    pub fn builder() -> AssistantApiConfigBuilder {
        AssistantApiConfigBuilder::new()
    }

    pub(crate) fn from_parts(
        config: AssistantApiConfig,
        cache: TtlCache<Value>,
        executor: RequestExecutor,
    ) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "signalhub_fallback_calls_total",
                "Assistant API calls by outcome (cache_hit, success, exhausted)"
            );
            describe_counter!(
                "signalhub_fallback_endpoint_failures_total",
                "Candidate endpoints that failed"
            );
        }

        Self {
            config: Arc::new(config),
            cache,
            executor,
        }
    }

    pub fn config(&self) -> &AssistantApiConfig {
        &self.config
    }

    /// The cache responses are stored in.
    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Lists one page of the workspace's assistants.
    pub async fn list_assistants(
        &self,
        page_num: u32,
        page_size: u32,
    ) -> Result<Value, FallbackError> {
        self.fetch(&AssistantCall::list(page_num, page_size)).await
    }

    /// Sends `query` to an assistant, continuing `conversation_id` if given.
    pub async fn chat(
        &self,
        assistant_id: &str,
        query: &str,
        conversation_id: Option<&str>,
    ) -> Result<Value, FallbackError> {
        let mut call = AssistantCall::chat(assistant_id, query);
        if let Some(id) = conversation_id {
            call = call.in_conversation(id);
        }
        self.fetch(&call).await
    }

    /// Returns the envelope payload for `call`, from the cache or from the
    /// first endpoint that answers.
    pub async fn fetch(&self, call: &AssistantCall) -> Result<Value, FallbackError> {
        let token = self
            .config
            .token()
            .ok_or_else(|| FallbackError::Configuration("access token is not set".to_string()))?;

        let operation = call.operation();
        let payload = call.payload(&self.config.workspace_id);
        let key = call.cache_key(&payload);

        if let Some(cached) = self.cache.get(&key) {
            #[cfg(feature = "tracing")]
            debug!(
                client = %self.config.name,
                operation = operation.as_str(),
                key = %key,
                "served from cache"
            );

            #[cfg(feature = "metrics")]
            counter!(
                "signalhub_fallback_calls_total",
                "client" => self.config.name.clone(),
                "outcome" => "cache_hit"
            )
            .increment(1);

            self.emit(FallbackEvent::CacheHit {
                client_name: self.config.name.clone(),
                timestamp: Instant::now(),
                key,
            });
            return Ok(cached);
        }

        let endpoints = self.config.endpoints(operation);
        let mut last_error = None;

        for (index, endpoint) in endpoints.iter().enumerate() {
            let options = RequestOptions::post()
                .query("access_token", token)
                .json(payload.clone());

            let envelope = match self
                .executor
                .execute::<Envelope>(endpoint, options, operation.label())
                .await
            {
                Ok(envelope) => envelope,
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    warn!(
                        client = %self.config.name,
                        endpoint = %endpoint,
                        error = %error,
                        "endpoint failed, trying next"
                    );

                    #[cfg(feature = "metrics")]
                    counter!(
                        "signalhub_fallback_endpoint_failures_total",
                        "client" => self.config.name.clone()
                    )
                    .increment(1);

                    self.emit(FallbackEvent::EndpointFailed {
                        client_name: self.config.name.clone(),
                        timestamp: Instant::now(),
                        endpoint: endpoint.clone(),
                        kind: error.kind(),
                    });
                    last_error = Some(FallbackError::from(error));
                    continue;
                }
            };

            let data = match envelope.into_data(endpoint) {
                Ok(data) => data,
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    warn!(
                        client = %self.config.name,
                        endpoint = %endpoint,
                        error = %error,
                        "envelope reported failure, trying next"
                    );

                    #[cfg(feature = "metrics")]
                    counter!(
                        "signalhub_fallback_endpoint_failures_total",
                        "client" => self.config.name.clone()
                    )
                    .increment(1);

                    self.emit(FallbackEvent::EndpointFailed {
                        client_name: self.config.name.clone(),
                        timestamp: Instant::now(),
                        endpoint: endpoint.clone(),
                        kind: error.kind(),
                    });
                    last_error = Some(error);
                    continue;
                }
            };

            self.cache
                .set_with_ttl(key.as_str(), data.clone(), self.config.ttl(operation));

            #[cfg(feature = "metrics")]
            counter!(
                "signalhub_fallback_calls_total",
                "client" => self.config.name.clone(),
                "outcome" => "success"
            )
            .increment(1);

            self.emit(FallbackEvent::Succeeded {
                client_name: self.config.name.clone(),
                timestamp: Instant::now(),
                endpoint: endpoint.clone(),
                attempts: index + 1,
            });
            return Ok(data);
        }

        #[cfg(feature = "tracing")]
        warn!(
            client = %self.config.name,
            operation = operation.as_str(),
            tried = endpoints.len(),
            "all endpoints failed"
        );

        #[cfg(feature = "metrics")]
        counter!(
            "signalhub_fallback_calls_total",
            "client" => self.config.name.clone(),
            "outcome" => "exhausted"
        )
        .increment(1);

        self.emit(FallbackEvent::Exhausted {
            client_name: self.config.name.clone(),
            timestamp: Instant::now(),
            attempts: endpoints.len(),
        });
        Err(last_error.unwrap_or(FallbackError::Unknown))
    }

    fn emit(&self, event: FallbackEvent) {
        self.config.event_listeners.emit(&event);
    }
}

impl Service<AssistantCall> for FallbackClient {
    type Response = Value;
    type Error = FallbackError;
    type Future = BoxFuture<'static, Result<Value, FallbackError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: AssistantCall) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.fetch(&call).await })
    }
}
