//! Scheduler timing, drain amounts and random-event bands.

use std::time::Duration;

use dd_core::{CoreError, CoreResult};

/// Configuration for [`RealTimeScheduler`](crate::RealTimeScheduler).
///
/// Intervals are in milliseconds so the struct round-trips through JSON
/// without a custom `Duration` encoding.
///
/// The random-event tick draws one `u` per fire and picks the first band it
/// falls under: `storm_below`, then `failure_below`, then
/// `high_demand_below`; anything above is a quiet tick.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    pub dispatch_interval_ms:    u64,
    pub degradation_interval_ms: u64,
    /// Delay before the first random event.
    pub event_delay_ms:          u64,
    pub event_interval_ms:       u64,

    /// Percent drained per degradation tick from airborne vehicles.
    pub airborne_drain:    f64,
    /// Percent drained per degradation tick from idle vehicles below
    /// `idle_drain_below`.
    pub idle_drain:        f64,
    pub idle_drain_below:  f64,
    /// Airborne vehicles drained under this are reset at the depot, full.
    pub battery_floor:     f64,

    pub storm_below:       f64,
    pub failure_below:     f64,
    pub high_demand_below: f64,
    /// Battery lost by a failing vehicle that has more than this left;
    /// otherwise it loses half.
    pub failure_penalty:   f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            dispatch_interval_ms:    10_000,
            degradation_interval_ms: 30_000,
            event_delay_ms:          60_000,
            event_interval_ms:       120_000,
            airborne_drain:          0.5,
            idle_drain:              0.1,
            idle_drain_below:        95.0,
            battery_floor:           10.0,
            storm_below:             0.10,
            failure_below:           0.15,
            high_demand_below:       0.35,
            failure_penalty:         20.0,
        }
    }
}

impl SchedulerConfig {
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }

    pub fn degradation_interval(&self) -> Duration {
        Duration::from_millis(self.degradation_interval_ms)
    }

    pub fn event_delay(&self) -> Duration {
        Duration::from_millis(self.event_delay_ms)
    }

    pub fn event_interval(&self) -> Duration {
        Duration::from_millis(self.event_interval_ms)
    }

    pub fn validate(&self) -> CoreResult<()> {
        for (name, ms) in [
            ("dispatch_interval_ms", self.dispatch_interval_ms),
            ("degradation_interval_ms", self.degradation_interval_ms),
            ("event_interval_ms", self.event_interval_ms),
        ] {
            if ms == 0 {
                return Err(CoreError::Config(format!("{name} must be positive")));
            }
        }
        for (name, v) in [
            ("airborne_drain", self.airborne_drain),
            ("idle_drain", self.idle_drain),
            ("battery_floor", self.battery_floor),
            ("failure_penalty", self.failure_penalty),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(CoreError::Config(format!("{name} must be non-negative, got {v}")));
            }
        }
        let bands = [self.storm_below, self.failure_below, self.high_demand_below];
        if !bands.iter().all(|b| (0.0..=1.0).contains(b)) || !bands.is_sorted() {
            return Err(CoreError::Config(format!(
                "event bands must be ascending within [0, 1], got {bands:?}"
            )));
        }
        Ok(())
    }
}
