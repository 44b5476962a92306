//! Injectable time source.
//!
//! Timestamp-producing code takes a [`Clock`] so tests can pin or advance
//! time deterministically. Scheduling (debounce, abandonment timers) uses the
//! tokio timer instead, which tests drive with a paused runtime.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually advanced clock for deterministic tests.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// while the code under test holds another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Pin the clock to an exact instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let start: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();

        clock.advance(Duration::minutes(5));
        assert_eq!(handle.now(), start + Duration::minutes(5));
    }
}
