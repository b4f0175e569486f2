//! Dispatcher tuning knobs.

use dd_core::{CoreError, CoreResult};

/// Parameters of the dispatch cycle.
///
/// Loading and delivery pauses are simulated minutes added to delivery
/// timestamps; the dispatcher never sleeps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Upper bound of the grid rasterised by the route planner.
    pub grid_limit:          i32,
    /// Grid units per hour.
    pub cruise_speed:        f64,
    /// Charger throughput, percent per minute.
    pub recharge_rate:       f64,
    /// Chance that any one leg flies in adverse conditions.
    pub adverse_probability: f64,
    pub loading_minutes:     f64,
    pub delivery_minutes:    f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            grid_limit:          200,
            cruise_speed:        30.0,
            recharge_rate:       dd_battery::DEFAULT_RECHARGE_RATE,
            adverse_probability: 0.3,
            loading_minutes:     0.1,
            delivery_minutes:    0.05,
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.grid_limit <= 0 {
            return Err(CoreError::Config(format!("grid_limit must be positive, got {}", self.grid_limit)));
        }
        if !(self.cruise_speed.is_finite() && self.cruise_speed > 0.0) {
            return Err(CoreError::Config(format!("cruise_speed must be positive, got {}", self.cruise_speed)));
        }
        if !(self.recharge_rate.is_finite() && self.recharge_rate > 0.0) {
            return Err(CoreError::Config(format!("recharge_rate must be positive, got {}", self.recharge_rate)));
        }
        if !(0.0..=1.0).contains(&self.adverse_probability) {
            return Err(CoreError::Config(format!(
                "adverse_probability must be in [0, 1], got {}",
                self.adverse_probability
            )));
        }
        if self.loading_minutes < 0.0 || self.delivery_minutes < 0.0 {
            return Err(CoreError::Config("loading/delivery minutes must be non-negative".into()));
        }
        Ok(())
    }

    /// Simulated flight time for `distance` grid units, in minutes.
    #[inline]
    pub fn flight_minutes(&self, distance: f64) -> f64 {
        distance / self.cruise_speed * 60.0
    }
}
