//! Registered delivery vehicles.

use dd_core::{time::minutes_between, CoreResult, GridPoint, Timestamp, VehicleId, VehicleState};

use crate::Order;

/// One delivery vehicle.
///
/// Fields are public for the dispatcher and scheduler, which own all
/// mission-time mutation.  State changes should go through
/// [`transition`](Self::transition) or the charging helpers so illegal
/// edges are rejected.
///
/// Invariants:
/// - `battery` stays in `[0, 100]` (see [`set_battery`](Self::set_battery)).
/// - `orders` is non-empty only while [`VehicleState::is_on_mission`].
/// - `charging_since.is_some()` exactly while `state == Charging`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub id:        VehicleId,
    /// Maximum payload weight.
    pub capacity:  f64,
    /// Battery capacity baseline; the battery is never edited above it.
    pub max_range: f64,
    /// Percent in `[0, 100]`.
    pub battery:   f64,
    pub position:  GridPoint,
    pub state:     VehicleState,
    /// Orders currently on board, in delivery sequence.
    pub orders:    Vec<Order>,
    /// When the current charge started.
    pub charging_since: Option<Timestamp>,
    /// Last time recharge progress was applied.
    pub charge_updated: Option<Timestamp>,
}

impl Vehicle {
    /// A new vehicle: full battery, idle at the depot.
    pub fn new(id: VehicleId, capacity: f64, max_range: f64) -> Self {
        Self {
            id,
            capacity,
            max_range,
            battery:        dd_battery::FULL,
            position:       GridPoint::DEPOT,
            state:          VehicleState::Idle,
            orders:         Vec::new(),
            charging_since: None,
            charge_updated: None,
        }
    }

    /// Move to `to` along a legal state-machine edge.
    pub fn transition(&mut self, to: VehicleState) -> CoreResult<()> {
        self.state = self.state.transition(to)?;
        Ok(())
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == VehicleState::Idle
    }

    #[inline]
    pub fn is_charging(&self) -> bool {
        self.state == VehicleState::Charging
    }

    pub fn is_low(&self) -> bool {
        dd_battery::is_low(self.battery)
    }

    pub fn is_critical(&self) -> bool {
        dd_battery::is_critical(self.battery)
    }

    /// Set the battery, clamped to `[0, 100]`.
    pub fn set_battery(&mut self, battery: f64) {
        self.battery = dd_battery::clamp(battery, dd_battery::FULL);
    }

    /// Subtract `percent`, never going below zero.
    pub fn consume(&mut self, percent: f64) {
        self.set_battery(self.battery - percent.max(0.0));
    }

    /// Total weight of the orders on board.
    pub fn payload(&self) -> f64 {
        self.orders.iter().map(|o| o.weight).sum()
    }

    pub fn distance_to_depot(&self) -> f64 {
        self.position.distance_to_depot()
    }

    // ── Charging ──────────────────────────────────────────────────────────

    /// Dock and start charging at `now`.  Legal from `Idle` and `Returning`.
    pub fn start_charging(&mut self, now: Timestamp) -> CoreResult<()> {
        self.transition(VehicleState::Charging)?;
        self.charging_since = Some(now);
        self.charge_updated = Some(now);
        Ok(())
    }

    /// Finish charging: battery full, back to `Idle`.
    pub fn finish_charging(&mut self) -> CoreResult<()> {
        self.transition(VehicleState::Idle)?;
        self.battery = dd_battery::FULL;
        self.charging_since = None;
        self.charge_updated = None;
        Ok(())
    }

    /// Apply charge gained since the last update at `rate_per_minute`.
    ///
    /// Returns `true` if the vehicle reached 100% and left `Charging`.
    /// Does nothing for a vehicle that is not charging.
    pub fn advance_charge(&mut self, now: Timestamp, rate_per_minute: f64) -> CoreResult<bool> {
        if !self.is_charging() {
            return Ok(false);
        }
        let since = self.charge_updated.or(self.charging_since).unwrap_or(now);
        let minutes = minutes_between(since, now);
        self.battery = dd_battery::recharge(self.battery, minutes, rate_per_minute);
        self.charge_updated = Some(now);
        if self.battery >= dd_battery::FULL {
            self.finish_charging()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Whole minutes spent on the charger so far; 0 if not charging.
    pub fn charging_minutes(&self, now: Timestamp) -> f64 {
        match self.charging_since {
            Some(since) if self.is_charging() => minutes_between(since, now).floor(),
            _ => 0.0,
        }
    }

    // ── Recall ────────────────────────────────────────────────────────────

    /// Abort whatever the vehicle is doing and put it idle at the depot.
    ///
    /// Mission states pass through `Returning`; a charging vehicle simply
    /// undocks.  Battery is left untouched.
    pub fn recall_to_depot(&mut self) -> CoreResult<()> {
        if self.state.is_on_mission() && self.state != VehicleState::Returning {
            self.transition(VehicleState::Returning)?;
        }
        if !self.is_idle() {
            self.transition(VehicleState::Idle)?;
        }
        self.orders.clear();
        self.position = GridPoint::DEPOT;
        self.charging_since = None;
        self.charge_updated = None;
        Ok(())
    }
}
