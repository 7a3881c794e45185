//! Resilient outbound-request layer for the signalhub dashboard.
//!
//! This crate re-exports the component crates and wires them together once
//! at startup:
//!
//! - [`cache`]: bounded TTL cache with background sweeping
//! - [`executor`]: HTTP executor with timeout, retry, call metrics, health
//!   and a performance monitor
//! - [`errors`]: service error context, a generic retry wrapper and
//!   user-facing formatting
//! - [`fallback`]: multi-endpoint assistant API client and the
//!   generative-text client
//!
//! [`SignalHub`] builds one cache, one executor and one performance
//! monitor, and hands the same instances to every client that needs them.
//!
//! # Examples
//!
//! ```no_run
//! use signalhub::SignalHub;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let hub = SignalHub::builder()
//!     .cache(|cache| cache.max_size(500))
//!     .executor(|executor| executor.timeout(Duration::from_secs(15)))
//!     .assistants(|api| {
//!         api.access_token("token")
//!             .workspace_id("ws-1")
//!             .list_endpoint("https://api.example.com/v1/assistants/list")
//!             .chat_endpoint("https://api.example.com/v1/assistants/chat")
//!     })
//!     .build();
//!
//! let assistants = hub.assistants().list_assistants(1, 20).await;
//! println!("{:?} {:?}", assistants.is_ok(), hub.executor().health_status().status);
//! # }
//! ```

pub use signalhub_cache as cache;
pub use signalhub_core as core;
pub use signalhub_errors as errors;
pub use signalhub_executor as executor;
pub use signalhub_fallback as fallback;

use serde_json::Value;
use signalhub_cache::{CacheConfigBuilder, SweeperHandle, TtlCache};
use signalhub_core::EventTally;
use signalhub_executor::{ExecutorConfigBuilder, PerformanceMonitor, RequestExecutor};
use signalhub_fallback::{
    AssistantApiConfigBuilder, FallbackClient, GenerativeClient, GenerativeConfigBuilder,
};

/// The shared instances of the request layer.
///
/// Clients built here share the cache, the executor (and so its metrics)
/// and the performance monitor. Events of all three components are counted
/// in one [`EventTally`]. Dropping the hub stops the cache sweeper.
pub struct SignalHub {
    cache: TtlCache<Value>,
    executor: RequestExecutor,
    monitor: PerformanceMonitor,
    events: EventTally,
    assistants: FallbackClient,
    generative: GenerativeClient,
    sweeper: Option<SweeperHandle>,
}

impl SignalHub {
    pub fn builder() -> SignalHubBuilder {
        SignalHubBuilder::new()
    }

    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn performance_monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    /// Event counts of the cache, the executor and the assistant client.
    pub fn events(&self) -> &EventTally {
        &self.events
    }

    /// The assistant API client.
    pub fn assistants(&self) -> &FallbackClient {
        &self.assistants
    }

    /// The generative-text client.
    pub fn generative(&self) -> &GenerativeClient {
        &self.generative
    }

    /// Whether the background cache sweeper is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .as_ref()
            .is_some_and(|sweeper| !sweeper.is_finished())
    }
}

/// Builder for [`SignalHub`].
pub struct SignalHubBuilder {
    cache: CacheConfigBuilder<Value>,
    executor: ExecutorConfigBuilder,
    assistants: AssistantApiConfigBuilder,
    generative: GenerativeConfigBuilder,
    sweeper: bool,
}

impl SignalHubBuilder {
    /// Creates a builder with each component's defaults and the sweeper on.
    pub fn new() -> Self {
        Self {
            cache: CacheConfigBuilder::new().name("signalhub"),
            executor: ExecutorConfigBuilder::new().name("signalhub"),
            assistants: AssistantApiConfigBuilder::new().name("assistants"),
            generative: GenerativeConfigBuilder::new(),
            sweeper: true,
        }
    }

    /// Configures the shared cache.
    pub fn cache<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CacheConfigBuilder<Value>) -> CacheConfigBuilder<Value>,
    {
        self.cache = f(self.cache);
        self
    }

    /// Configures the shared executor.
    pub fn executor<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ExecutorConfigBuilder) -> ExecutorConfigBuilder,
    {
        self.executor = f(self.executor);
        self
    }

    /// Configures the assistant API client.
    pub fn assistants<F>(mut self, f: F) -> Self
    where
        F: FnOnce(AssistantApiConfigBuilder) -> AssistantApiConfigBuilder,
    {
        self.assistants = f(self.assistants);
        self
    }

    /// Configures the generative-text client.
    pub fn generative<F>(mut self, f: F) -> Self
    where
        F: FnOnce(GenerativeConfigBuilder) -> GenerativeConfigBuilder,
    {
        self.generative = f(self.generative);
        self
    }

    /// Whether to run the background cache sweeper. Default: true.
    pub fn sweeper(mut self, enabled: bool) -> Self {
        self.sweeper = enabled;
        self
    }

    /// Builds the hub.
    ///
    /// # Panics
    ///
    /// Panics if the sweeper is enabled and this is called outside a Tokio
    /// runtime.
    pub fn build(self) -> SignalHub {
        let monitor = PerformanceMonitor::new();
        let events = EventTally::new();
        let cache = self.cache.listener(events.clone()).build();
        let executor = self
            .executor
            .performance_monitor(monitor.clone())
            .listener(events.clone())
            .build();

        let assistants = self
            .assistants
            .listener(events.clone())
            .cache(cache.clone())
            .executor(executor.clone())
            .build();
        let generative = self.generative.executor(executor.clone()).build();
        let sweeper = self.sweeper.then(|| cache.start_sweeper());

        SignalHub {
            cache,
            executor,
            monitor,
            events,
            assistants,
            generative,
            sweeper,
        }
    }
}

impl Default for SignalHubBuilder {
    fn default() -> Self {
        Self::new()
    }
}
