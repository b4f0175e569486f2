//! Wall-clock access for recharge timing and delivery timestamps.
//!
//! The dispatcher never calls `Utc::now()` directly; it asks its [`Clock`].
//! [`ManualClock`] is a shared handle: clone it, hand one copy to the
//! dispatcher, and advance the other from a test.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// UTC timestamp used throughout the workspace.
pub type Timestamp = DateTime<Utc>;

/// A source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Start at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(Timestamp::default())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.advance(Duration::minutes(minutes));
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Fractional minutes from `earlier` to `later`; negative spans count as 0.
pub fn minutes_between(earlier: Timestamp, later: Timestamp) -> f64 {
    let millis = (later - earlier).num_milliseconds().max(0);
    millis as f64 / 60_000.0
}
