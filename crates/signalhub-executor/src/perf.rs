//! Named latency measurements.
//!
//! ```
//! use signalhub_executor::PerformanceMonitor;
//!
//! let monitor = PerformanceMonitor::new();
//! let measurement = monitor.start_measurement("brands.load");
//! // ... work ...
//! measurement.stop();
//!
//! let stats = monitor.stats("brands.load").unwrap();
//! assert_eq!(stats.count, 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Aggregates for one measurement name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementStats {
    pub count: u64,
    pub average: Duration,
    pub min: Duration,
    pub max: Duration,
    pub total: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Aggregate {
    count: u64,
    total: Duration,
    min: Duration,
    max: Duration,
}

impl Aggregate {
    fn first(sample: Duration) -> Self {
        Self {
            count: 1,
            total: sample,
            min: sample,
            max: sample,
        }
    }

    fn add(&mut self, sample: Duration) {
        self.count += 1;
        self.total = self.total.saturating_add(sample);
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
    }

    fn stats(&self) -> MeasurementStats {
        let divisor = u32::try_from(self.count).unwrap_or(u32::MAX);
        MeasurementStats {
            count: self.count,
            average: self.total / divisor,
            min: self.min,
            max: self.max,
            total: self.total,
        }
    }
}

/// Collects duration samples under names.
///
/// Only running aggregates are kept per name, so memory does not grow with
/// the number of samples. Clones share the same measurements.
#[derive(Debug, Clone, Default)]
pub struct PerformanceMonitor {
    samples: Arc<Mutex<HashMap<String, Aggregate>>>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts timing `name`. The sample is recorded when the returned
    /// [`Measurement`] is stopped; dropping it records nothing.
    pub fn start_measurement(&self, name: impl Into<String>) -> Measurement {
        Measurement {
            monitor: self.clone(),
            name: name.into(),
            started: Instant::now(),
        }
    }

    /// Records a sample directly.
    pub fn record(&self, name: &str, sample: Duration) {
        let mut samples = self.samples();
        match samples.get_mut(name) {
            Some(aggregate) => aggregate.add(sample),
            None => {
                samples.insert(name.to_string(), Aggregate::first(sample));
            }
        }
    }

    /// Times `future` under `name` and returns its output.
    pub async fn measure<F: Future>(&self, name: &str, future: F) -> F::Output {
        let measurement = self.start_measurement(name);
        let output = future.await;
        measurement.stop();
        output
    }

    /// Stats for `name`, or `None` if it has no samples.
    pub fn stats(&self, name: &str) -> Option<MeasurementStats> {
        self.samples().get(name).map(Aggregate::stats)
    }

    /// Stats for every name, sorted by name.
    pub fn all_stats(&self) -> BTreeMap<String, MeasurementStats> {
        self.samples()
            .iter()
            .map(|(name, aggregate)| (name.clone(), aggregate.stats()))
            .collect()
    }

    /// Forgets every sample.
    pub fn clear(&self) {
        self.samples().clear();
    }

    fn samples(&self) -> MutexGuard<'_, HashMap<String, Aggregate>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A running measurement. Call [`stop`](Self::stop) to record it.
#[derive(Debug)]
#[must_use = "a measurement records nothing until stopped"]
pub struct Measurement {
    monitor: PerformanceMonitor,
    name: String,
    started: Instant,
}

impl Measurement {
    /// Records the elapsed time and returns it.
    pub fn stop(self) -> Duration {
        let elapsed = self.started.elapsed();
        self.monitor.record(&self.name, elapsed);
        elapsed
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
