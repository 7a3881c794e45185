//! Configuration for the fallback client.

use crate::call::Operation;
use crate::events::FallbackEvent;
use crate::FallbackClient;
use serde_json::Value;
use signalhub_cache::TtlCache;
use signalhub_core::{ErrorKind, EventListener, EventListeners, FnListener};
use signalhub_executor::RequestExecutor;
use std::time::Duration;

/// Settings of a [`FallbackClient`].
pub struct AssistantApiConfig {
    pub(crate) name: String,
    pub(crate) access_token: Option<String>,
    pub(crate) workspace_id: String,
    pub(crate) list_endpoints: Vec<String>,
    pub(crate) chat_endpoints: Vec<String>,
    pub(crate) list_ttl: Duration,
    pub(crate) chat_ttl: Duration,
    pub(crate) event_listeners: EventListeners<FallbackEvent>,
}

impl AssistantApiConfig {
    /// Candidate endpoints for `operation`, most authoritative first.
    pub fn endpoints(&self, operation: Operation) -> &[String] {
        match operation {
            Operation::ListAssistants => &self.list_endpoints,
            Operation::Chat => &self.chat_endpoints,
        }
    }

    /// How long a successful response to `operation` is cached.
    pub fn ttl(&self, operation: Operation) -> Duration {
        match operation {
            Operation::ListAssistants => self.list_ttl,
            Operation::Chat => self.chat_ttl,
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// The access token, unless missing or blank.
    pub(crate) fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Builder for a [`FallbackClient`].
pub struct AssistantApiConfigBuilder {
    config: AssistantApiConfig,
    cache: Option<TtlCache<Value>>,
    executor: Option<RequestExecutor>,
}

impl AssistantApiConfigBuilder {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - no access token (calls fail with a configuration error)
    /// - no endpoints
    /// - list_ttl: 10 minutes
    /// - chat_ttl: 1 minute
    /// - a private cache and a default executor
    pub fn new() -> Self {
        Self {
            config: AssistantApiConfig {
                name: "<unnamed>".to_string(),
                access_token: None,
                workspace_id: String::new(),
                list_endpoints: Vec::new(),
                chat_endpoints: Vec::new(),
                list_ttl: Duration::from_secs(600),
                chat_ttl: Duration::from_secs(60),
                event_listeners: EventListeners::new(),
            },
            cache: None,
            executor: None,
        }
    }

    /// Sets the name used in logs, metrics and events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the token sent as the `access_token` query parameter.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    /// Sets the workspace every call is scoped to.
    pub fn workspace_id(mut self, id: impl Into<String>) -> Self {
        self.config.workspace_id = id.into();
        self
    }

    /// Appends a candidate endpoint for listing assistants.
    pub fn list_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.list_endpoints.push(url.into());
        self
    }

    /// Appends a candidate endpoint for chat calls.
    pub fn chat_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.chat_endpoints.push(url.into());
        self
    }

    /// Sets how long assistant lists are cached.
    pub fn list_ttl(mut self, ttl: Duration) -> Self {
        self.config.list_ttl = ttl;
        self
    }

    /// Sets how long chat responses are cached.
    pub fn chat_ttl(mut self, ttl: Duration) -> Self {
        self.config.chat_ttl = ttl;
        self
    }

    /// Caches responses in `cache`.
    pub fn cache(mut self, cache: TtlCache<Value>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Issues requests through `executor`.
    pub fn executor(mut self, executor: RequestExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Registers a listener for every client event.
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<FallbackEvent> + 'static,
    {
        self.config.event_listeners.add(listener);
        self
    }

    /// Called with the cache key when a response is served from the cache.
    pub fn on_cache_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config
            .event_listeners
            .add(FnListener::new(move |event| {
                if let FallbackEvent::CacheHit { key, .. } = event {
                    f(key);
                }
            }));
        self
    }

    /// Called with the endpoint and error kind whenever an endpoint fails.
    pub fn on_endpoint_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, ErrorKind) + Send + Sync + 'static,
    {
        self.config
            .event_listeners
            .add(FnListener::new(move |event| {
                if let FallbackEvent::EndpointFailed { endpoint, kind, .. } = event {
                    f(endpoint, *kind);
                }
            }));
        self
    }

    /// Called with the endpoint that answered and the number of endpoints tried.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.config
            .event_listeners
            .add(FnListener::new(move |event| {
                if let FallbackEvent::Succeeded {
                    endpoint, attempts, ..
                } = event
                {
                    f(endpoint, *attempts);
                }
            }));
        self
    }

    /// Called with the number of endpoints tried when all of them failed.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.config
            .event_listeners
            .add(FnListener::new(move |event| {
                if let FallbackEvent::Exhausted { attempts, .. } = event {
                    f(*attempts);
                }
            }));
        self
    }

    /// Builds the client.
    pub fn build(self) -> FallbackClient {
        let cache = self.cache.unwrap_or_else(|| TtlCache::builder().build());
        let executor = self
            .executor
            .unwrap_or_else(|| RequestExecutor::builder().build());
        FallbackClient::from_parts(self.config, cache, executor)
    }
}

impl Default for AssistantApiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
