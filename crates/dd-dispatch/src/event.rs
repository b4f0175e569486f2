//! Structured domain events and the observers that consume them.
//!
//! The dispatcher and scheduler never print.  Everything worth knowing is a
//! [`FleetEvent`] handed to a [`DispatchObserver`]; what happens next
//! (structured logging, recording, nothing) is the observer's business.

use std::sync::{Arc, Mutex};

use dd_core::{GridPoint, OrderId, Timestamp, VehicleId, VehicleState};

use crate::CycleSummary;

// ── Events ────────────────────────────────────────────────────────────────────

/// Why a vehicle was sent home early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTrigger {
    /// Battery at or below the critical threshold.
    Critical,
    /// Battery low and not enough left for a safe return.
    LowReserve,
    /// Operator request.
    Manual,
}

impl ReturnTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnTrigger::Critical   => "critical",
            ReturnTrigger::LowReserve => "low_reserve",
            ReturnTrigger::Manual     => "manual",
        }
    }
}

/// Everything observable that happens to the fleet.
#[derive(Debug, Clone, PartialEq)]
pub enum FleetEvent {
    OrderQueued { order: OrderId, position: usize },
    OrderRejected { destination: GridPoint, zone: String, reason: String },
    /// Queued orders held back this cycle because the depot line crosses a zone.
    OrdersBlocked { count: usize },
    ChargingStarted { vehicle: VehicleId, battery: f64 },
    ChargingFinished { vehicle: VehicleId },
    Recharged { vehicle: VehicleId },
    EmergencyReturn { vehicle: VehicleId, battery: f64, trigger: ReturnTrigger },
    /// A batch was not accepted: the round trip would break the return margin.
    BatchDeferred { vehicle: VehicleId, orders: usize, battery: f64, projected_distance: f64 },
    MissionStarted { vehicle: VehicleId, orders: usize, payload: f64 },
    DetourTaken {
        vehicle:         VehicleId,
        order:           OrderId,
        waypoint:        GridPoint,
        distance:        f64,
        direct_distance: f64,
    },
    OrderDelivered {
        vehicle:      VehicleId,
        order:        OrderId,
        distance:     f64,
        minutes:      f64,
        battery_used: f64,
        adverse:      bool,
    },
    /// The rest of a batch was dropped mid-route to keep the return margin.
    MissionAborted { vehicle: VehicleId, dropped: usize, battery: f64 },
    MissionCompleted { vehicle: VehicleId, delivered: usize, battery: f64, state: VehicleState },
    /// Background drain pushed a vehicle below the floor; it was reset.
    FloorRecovery { vehicle: VehicleId, battery: f64 },
    /// Fleet-wide recall of every busy vehicle.
    StormRecall { vehicles: usize },
    VehicleFailure { vehicle: VehicleId, battery_before: f64, battery_after: f64 },
    HighDemand,
}

impl FleetEvent {
    /// Short machine-readable name.
    pub fn kind(&self) -> &'static str {
        match self {
            FleetEvent::OrderQueued { .. }      => "order_queued",
            FleetEvent::OrderRejected { .. }    => "order_rejected",
            FleetEvent::OrdersBlocked { .. }    => "orders_blocked",
            FleetEvent::ChargingStarted { .. }  => "charging_started",
            FleetEvent::ChargingFinished { .. } => "charging_finished",
            FleetEvent::Recharged { .. }        => "recharged",
            FleetEvent::EmergencyReturn { .. }  => "emergency_return",
            FleetEvent::BatchDeferred { .. }    => "batch_deferred",
            FleetEvent::MissionStarted { .. }   => "mission_started",
            FleetEvent::DetourTaken { .. }      => "detour_taken",
            FleetEvent::OrderDelivered { .. }   => "order_delivered",
            FleetEvent::MissionAborted { .. }   => "mission_aborted",
            FleetEvent::MissionCompleted { .. } => "mission_completed",
            FleetEvent::FloorRecovery { .. }    => "floor_recovery",
            FleetEvent::StormRecall { .. }      => "storm_recall",
            FleetEvent::VehicleFailure { .. }   => "vehicle_failure",
            FleetEvent::HighDemand              => "high_demand",
        }
    }
}

// ── Observer trait ────────────────────────────────────────────────────────────

/// Callbacks invoked by the dispatcher.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  `Send` so the dispatcher can be shared
/// with the scheduler's tasks.
pub trait DispatchObserver: Send {
    fn on_event(&mut self, _at: Timestamp, _event: &FleetEvent) {}

    fn on_cycle_start(&mut self, _at: Timestamp) {}

    fn on_cycle_end(&mut self, _at: Timestamp, _summary: &CycleSummary) {}
}

/// An observer that does nothing.
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}

// ── TracingObserver ───────────────────────────────────────────────────────────

/// Emits every event as a structured `tracing` record under the
/// `dd_dispatch` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn on_event(&mut self, _at: Timestamp, event: &FleetEvent) {
        use tracing::{debug, error, info, warn};

        let kind = event.kind();
        match event {
            FleetEvent::OrderQueued { order, position } => {
                debug!(kind, %order, position, "order queued");
            }
            FleetEvent::OrderRejected { destination, zone, reason } => {
                warn!(kind, %destination, %zone, %reason, "order rejected: destination in exclusion zone");
            }
            FleetEvent::OrdersBlocked { count } => {
                debug!(kind, count, "orders held back by zones on the depot line");
            }
            FleetEvent::ChargingStarted { vehicle, battery } => {
                info!(kind, %vehicle, battery = format_args!("{battery:.1}"), "charging started");
            }
            FleetEvent::ChargingFinished { vehicle } => {
                info!(kind, %vehicle, "charging finished");
            }
            FleetEvent::Recharged { vehicle } => {
                info!(kind, %vehicle, "recharged by operator");
            }
            FleetEvent::EmergencyReturn { vehicle, battery, trigger } => {
                warn!(
                    kind,
                    %vehicle,
                    battery = format_args!("{battery:.1}"),
                    trigger = trigger.as_str(),
                    "emergency return to depot"
                );
            }
            FleetEvent::BatchDeferred { vehicle, orders, battery, projected_distance } => {
                warn!(
                    kind,
                    %vehicle,
                    orders,
                    battery = format_args!("{battery:.1}"),
                    projected_distance = format_args!("{projected_distance:.1}"),
                    "batch deferred: insufficient battery"
                );
            }
            FleetEvent::MissionStarted { vehicle, orders, payload } => {
                info!(kind, %vehicle, orders, payload, "mission started");
            }
            FleetEvent::DetourTaken { vehicle, order, waypoint, distance, direct_distance } => {
                info!(
                    kind,
                    %vehicle,
                    %order,
                    %waypoint,
                    distance = format_args!("{distance:.1}"),
                    direct_distance = format_args!("{direct_distance:.1}"),
                    "detour around exclusion zone"
                );
            }
            FleetEvent::OrderDelivered { vehicle, order, distance, minutes, battery_used, adverse } => {
                info!(
                    kind,
                    %vehicle,
                    %order,
                    distance = format_args!("{distance:.1}"),
                    minutes = format_args!("{minutes:.1}"),
                    battery_used = format_args!("{battery_used:.2}"),
                    adverse,
                    "order delivered"
                );
            }
            FleetEvent::MissionAborted { vehicle, dropped, battery } => {
                warn!(
                    kind,
                    %vehicle,
                    dropped,
                    battery = format_args!("{battery:.1}"),
                    "mission aborted: insufficient battery for safe return"
                );
            }
            FleetEvent::MissionCompleted { vehicle, delivered, battery, state } => {
                info!(
                    kind,
                    %vehicle,
                    delivered,
                    battery = format_args!("{battery:.1}"),
                    %state,
                    "mission completed"
                );
            }
            FleetEvent::FloorRecovery { vehicle, battery } => {
                error!(
                    kind,
                    %vehicle,
                    battery = format_args!("{battery:.1}"),
                    "battery below floor, vehicle reset at depot"
                );
            }
            FleetEvent::StormRecall { vehicles } => {
                warn!(kind, vehicles, "storm: all busy vehicles recalled");
            }
            FleetEvent::VehicleFailure { vehicle, battery_before, battery_after } => {
                warn!(
                    kind,
                    %vehicle,
                    battery_before = format_args!("{battery_before:.1}"),
                    battery_after = format_args!("{battery_after:.1}"),
                    "vehicle failure, recalled"
                );
            }
            FleetEvent::HighDemand => {
                info!(kind, "high demand period");
            }
        }
    }

    fn on_cycle_end(&mut self, _at: Timestamp, summary: &CycleSummary) {
        tracing::debug!(
            missions = summary.missions,
            delivered = summary.delivered,
            deferred = summary.deferred,
            aborted = summary.aborted,
            emergency_returns = summary.emergency_returns,
            "dispatch cycle finished"
        );
    }
}

// ── RecordingObserver ─────────────────────────────────────────────────────────

/// Keeps every event in memory.  Clones share the same buffer, so a test can
/// keep one handle and give the other to the dispatcher.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<(Timestamp, FleetEvent)>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<FleetEvent> {
        self.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    /// Recorded event kinds, oldest first.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.lock().iter().map(|(_, e)| e.kind()).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.lock().iter().filter(|(_, e)| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Timestamp, FleetEvent)>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DispatchObserver for RecordingObserver {
    fn on_event(&mut self, at: Timestamp, event: &FleetEvent) {
        self.lock().push((at, event.clone()));
    }
}
