//! Read-only views over the fleet: route comparison, battery snapshot,
//! statistics and the periodic fleet report.

use std::fmt;

use dd_core::{GridPoint, Timestamp, VehicleId, VehicleState};
use dd_route::Route;

use crate::Dispatcher;

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

// ── RouteReport ───────────────────────────────────────────────────────────────

/// A planned route compared with the straight line.
///
/// Distances are rounded to one decimal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouteReport {
    pub route:             Route,
    pub direct_distance:   f64,
    pub route_distance:    f64,
    /// `true` if the straight line crosses any zone.
    pub intersects_zone:   bool,
    /// Names of the zones the straight line crosses.
    pub intersected_zones: Vec<String>,
    pub detour_needed:     bool,
    pub extra_distance:    f64,
}

// ── BatterySnapshot ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BatteryStatus {
    pub vehicle:  VehicleId,
    /// Percent, two decimals.
    pub battery:  f64,
    pub state:    VehicleState,
    pub position: GridPoint,
    pub low:      bool,
    pub critical: bool,
    pub charging: bool,
    /// Whole minutes on the charger; `None` when not charging.
    pub charging_minutes: Option<f64>,
}

/// Battery state of the whole fleet at one instant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BatterySnapshot {
    pub at:             Timestamp,
    pub vehicles:       Vec<BatteryStatus>,
    pub total_vehicles: usize,
    pub low_battery:    usize,
    pub charging:       usize,
}

// ── FleetStatistics ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FleetStatistics {
    pub total_deliveries:      usize,
    pub total_vehicles:        usize,
    pub queued_orders:         usize,
    /// Mean flight minutes per delivery, two decimals; 0 with no deliveries.
    pub mean_delivery_minutes: f64,
    /// Vehicle with the most deliveries; ties go to the one that delivered
    /// first.
    pub busiest_vehicle:       Option<VehicleId>,
}

// ── FleetReport ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleLine {
    pub vehicle: VehicleId,
    pub state:   VehicleState,
    pub battery: f64,
}

/// Periodic human-readable summary.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetReport {
    pub at:        Timestamp,
    pub vehicles:  Vec<VehicleLine>,
    pub queued:    usize,
    pub delivered: usize,
}

impl fmt::Display for FleetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fleet report {}", self.at.format("%H:%M:%S"))?;
        writeln!(
            f,
            "  vehicles: {}  queued: {}  delivered: {}",
            self.vehicles.len(),
            self.queued,
            self.delivered
        )?;
        for line in &self.vehicles {
            writeln!(
                f,
                "  {:<12} {:<10} {:>5.1}%",
                line.vehicle.as_str(),
                line.state.as_str(),
                line.battery
            )?;
        }
        Ok(())
    }
}

// ── Dispatcher views ──────────────────────────────────────────────────────────

impl Dispatcher {
    /// Plan `start → end` and compare it with the straight line.
    pub fn route_report(&self, start: GridPoint, end: GridPoint) -> RouteReport {
        let zones = self.fleet.zones();
        let route = self.planner.plan(start, end, zones.as_slice(), self.config.grid_limit);

        let direct = start.distance(end);
        let planned = route.total_distance();
        let intersected_zones: Vec<String> =
            zones.crossing(start, end).into_iter().map(|z| z.name.clone()).collect();

        RouteReport {
            direct_distance:   round_to(direct, 1),
            route_distance:    round_to(planned, 1),
            intersects_zone:   !intersected_zones.is_empty(),
            intersected_zones,
            detour_needed:     route.is_detour(),
            extra_distance:    round_to(planned - direct, 1),
            route,
        }
    }

    pub fn battery_snapshot(&self) -> BatterySnapshot {
        let now = self.clock.now();
        let vehicles: Vec<BatteryStatus> = self
            .fleet
            .vehicles()
            .iter()
            .map(|v| BatteryStatus {
                vehicle:  v.id.clone(),
                battery:  round_to(v.battery, 2),
                state:    v.state,
                position: v.position,
                low:      v.is_low(),
                critical: v.is_critical(),
                charging: v.is_charging(),
                charging_minutes: v.is_charging().then(|| v.charging_minutes(now)),
            })
            .collect();

        BatterySnapshot {
            at:             now,
            total_vehicles: vehicles.len(),
            low_battery:    vehicles.iter().filter(|s| s.low).count(),
            charging:       vehicles.iter().filter(|s| s.charging).count(),
            vehicles,
        }
    }

    pub fn statistics(&self) -> FleetStatistics {
        let history = self.fleet.history();

        let mean = if history.is_empty() {
            0.0
        } else {
            let total: f64 = history.iter().map(|d| d.minutes).sum();
            round_to(total / history.len() as f64, 2)
        };

        // Per-vehicle counts in order of first delivery.
        let mut counts: Vec<(&VehicleId, usize)> = Vec::new();
        for d in history.iter() {
            match counts.iter_mut().find(|(id, _)| *id == &d.vehicle) {
                Some((_, n)) => *n += 1,
                None => counts.push((&d.vehicle, 1)),
            }
        }
        let busiest = counts
            .iter()
            .fold(None::<(&VehicleId, usize)>, |best, &(id, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((id, n)),
            })
            .map(|(id, _)| id.clone());

        FleetStatistics {
            total_deliveries:      history.len(),
            total_vehicles:        self.fleet.vehicles().len(),
            queued_orders:         self.fleet.queue().len(),
            mean_delivery_minutes: mean,
            busiest_vehicle:       busiest,
        }
    }

    pub fn report(&self) -> FleetReport {
        FleetReport {
            at:        self.clock.now(),
            vehicles:  self
                .fleet
                .vehicles()
                .iter()
                .map(|v| VehicleLine { vehicle: v.id.clone(), state: v.state, battery: v.battery })
                .collect(),
            queued:    self.fleet.queue().len(),
            delivered: self.fleet.history().len(),
        }
    }
}
