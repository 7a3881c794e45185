//! Multiplicative backoff.

use std::time::Duration;

/// Exponential backoff: `initial × multiplier^(retry - 1)`, optionally capped.
///
/// `retry` is 1-based: the wait after the first failed attempt is
/// `delay(1) == initial`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    initial: Duration,
    multiplier: f64,
    max: Option<Duration>,
}

impl ExponentialBackoff {
    /// Backoff starting at `initial` and doubling on every retry, uncapped.
    pub fn new(initial: Duration) -> Self {
        Self {
            initial,
            multiplier: 2.0,
            max: None,
        }
    }

    /// Sets the growth factor. Values below 1.0 are clamped to 1.0.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
        self
    }

    /// Caps every delay at `max`.
    pub fn max_delay(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }

    /// The initial delay.
    pub fn initial(&self) -> Duration {
        self.initial
    }

    /// Delay to wait before retry number `retry`.
    pub fn delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        let delay = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);

        match self.max {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
