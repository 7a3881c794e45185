//! Event system shared by the cache, executor and fallback client.
//!
//! Each component defines its own event enum, implements [`HubEvent`] for it
//! and exposes `on_*` builder callbacks that register [`FnListener`]s.
//! [`EventTally`] counts events across components for health displays.

use crate::error::ErrorKind;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// An observable event emitted by a signalhub component.
pub trait HubEvent: Send + Sync + fmt::Debug {
    /// Short, stable name of the event (e.g. `"hit"`, `"retry"`).
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn timestamp(&self) -> Instant;

    /// Name of the component instance that emitted the event.
    fn source_name(&self) -> &str;

    /// The kind of failure this event reports, if it reports one.
    fn failure(&self) -> Option<ErrorKind> {
        None
    }
}

/// Receives events of type `E`.
pub trait EventListener<E: HubEvent>: Send + Sync {
    /// Called once per emitted event.
    fn on_event(&self, event: &E);
}

/// Shared, type-erased listener.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// An ordered collection of listeners for one event type.
#[derive(Clone)]
pub struct EventListeners<E: HubEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: HubEvent> EventListeners<E> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// A panicking listener is isolated: the panic is caught and the
    /// remaining listeners still run.
    pub fn emit(&self, event: &E) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            source = event.source_name(),
            event = event.event_type(),
            failure = event.failure().map(ErrorKind::as_str),
            "event"
        );

        for listener in &self.listeners {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));

            #[cfg(feature = "tracing")]
            if outcome.is_err() {
                tracing::warn!(
                    source = event.source_name(),
                    event = event.event_type(),
                    "event listener panicked"
                );
            }
            #[cfg(not(feature = "tracing"))]
            let _ = outcome;
        }
    }

    /// Returns true if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: HubEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: HubEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Adapts a closure into an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _event: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: HubEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}

/// Counts events by type and failures by kind.
///
/// Clones share the same counts, so one tally can be registered as a
/// listener on several components and read from anywhere.
#[derive(Clone, Default)]
pub struct EventTally {
    counts: Arc<Mutex<TallyCounts>>,
}

#[derive(Default)]
struct TallyCounts {
    events: BTreeMap<(String, &'static str), u64>,
    failures: BTreeMap<ErrorKind, u64>,
}

impl EventTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `event_type` events emitted by `source`.
    pub fn count(&self, source: &str, event_type: &str) -> u64 {
        self.counts()
            .events
            .iter()
            .filter(|((name, kind), _)| name == source && *kind == event_type)
            .map(|(_, n)| n)
            .sum()
    }

    /// Number of `event_type` events across every source.
    pub fn total(&self, event_type: &str) -> u64 {
        self.counts()
            .events
            .iter()
            .filter(|((_, kind), _)| *kind == event_type)
            .map(|(_, n)| n)
            .sum()
    }

    /// Number of events that reported a failure of `kind`.
    pub fn failures(&self, kind: ErrorKind) -> u64 {
        self.counts().failures.get(&kind).copied().unwrap_or(0)
    }

    /// Resets every count.
    pub fn reset(&self) {
        let mut counts = self.counts();
        counts.events.clear();
        counts.failures.clear();
    }

    fn counts(&self) -> std::sync::MutexGuard<'_, TallyCounts> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: HubEvent> EventListener<E> for EventTally {
    fn on_event(&self, event: &E) {
        let mut counts = self.counts();
        *counts
            .events
            .entry((event.source_name().to_string(), event.event_type()))
            .or_insert(0) += 1;
        if let Some(kind) = event.failure() {
            *counts.failures.entry(kind).or_insert(0) += 1;
        }
    }
}

impl fmt::Debug for EventTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.counts();
        f.debug_struct("EventTally")
            .field("events", &counts.events)
            .field("failures", &counts.failures)
            .finish()
    }
}
