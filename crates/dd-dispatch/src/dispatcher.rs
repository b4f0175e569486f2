//! The `Dispatcher` and its dispatch cycle.

use chrono::Duration;

use dd_alloc::{round_trip_distance, Allocator};
use dd_battery::{consumption, safe_for_mission, sufficient_for_return};
use dd_core::{Clock, GridPoint, OrderId, RandomSource, Timestamp, VehicleId, VehicleState};
use dd_fleet::{Delivery, Fleet, FleetError, Order, OrderRequest, OrderStatus};
use dd_route::RoutePlanner;

use crate::{DispatchConfig, DispatchObserver, DispatchResult, FleetEvent, ReturnTrigger};

// ── CycleSummary ──────────────────────────────────────────────────────────────

/// Counters for one dispatch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Vehicles that finished charging.
    pub recharged:         usize,
    /// Idle vehicles put on the charger for critical battery.
    pub charging_started:  usize,
    pub emergency_returns: usize,
    /// Queued orders skipped because the depot line crosses a zone.
    pub blocked:           usize,
    /// Batches refused by the round-trip battery check.
    pub deferred:          usize,
    pub missions:          usize,
    pub delivered:         usize,
    /// Missions that dropped part of their batch.
    pub aborted:           usize,
    /// Orders dropped by aborted missions.
    pub dropped:           usize,
}

struct MissionOutcome {
    delivered: usize,
    dropped:   usize,
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// The mission state machine over a [`Fleet`].
///
/// One [`run_cycle`](Self::run_cycle) call:
///
/// 1. **Governance**: advance charging vehicles, send mid-mission vehicles
///    with a critical battery (or a low one that cannot make it home) back
///    to the depot, and dock idle vehicles at critical battery.
/// 2. **Allocation**: queued orders whose straight line from the depot is
///    clear of zones are partitioned over idle vehicles.
/// 3. **Admission**: each batch is sequenced and checked with
///    `safe_for_mission`; a refused batch stays queued.
/// 4. **Execution**: `Loading → InFlight → (Delivering → InFlight)* →
///    Returning → Idle | Charging`, planning a zone-avoiding route per leg
///    and aborting the rest of the batch when a leg would break the return
///    margin.
///
/// Create via [`DispatcherBuilder`][crate::DispatcherBuilder].
pub struct Dispatcher {
    pub(crate) fleet:     Fleet,
    pub(crate) config:    DispatchConfig,
    pub(crate) planner:   Box<dyn RoutePlanner>,
    pub(crate) allocator: Box<dyn Allocator>,
    pub(crate) rng:       Box<dyn RandomSource>,
    pub(crate) clock:     Box<dyn Clock>,
    pub(crate) observer:  Box<dyn DispatchObserver>,
}

impl Dispatcher {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn fleet_mut(&mut self) -> &mut Fleet {
        &mut self.fleet
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// The random source shared by adverse-weather sampling and fault
    /// injection.
    pub fn rng_mut(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }

    /// Hand `event` to the observer, stamped with the current time.
    pub fn emit(&mut self, event: FleetEvent) {
        let now = self.clock.now();
        self.observer.on_event(now, &event);
    }

    // ── Orders ────────────────────────────────────────────────────────────

    /// Queue an order, reporting acceptance or zone rejection as an event.
    pub fn submit_order(&mut self, request: OrderRequest) -> DispatchResult<OrderId> {
        let now = self.clock.now();
        match self.fleet.submit_order(request, now) {
            Ok(id) => {
                let position = self.fleet.queue().position(id).unwrap_or(0);
                self.emit(FleetEvent::OrderQueued { order: id, position });
                Ok(id)
            }
            Err(err) => {
                if let FleetError::ValidationRejected { point, zone, reason } = &err {
                    self.emit(FleetEvent::OrderRejected {
                        destination: *point,
                        zone:        zone.clone(),
                        reason:      reason.clone(),
                    });
                }
                Err(err.into())
            }
        }
    }

    pub fn order_status(&self, id: OrderId) -> OrderStatus {
        self.fleet.order_status(id)
    }

    // ── Dispatch cycle ────────────────────────────────────────────────────

    /// Run one full dispatch cycle.
    pub fn run_cycle(&mut self) -> DispatchResult<CycleSummary> {
        self.observer.on_cycle_start(self.clock.now());

        let mut summary = self.govern_batteries()?;
        if !self.fleet.queue().is_empty() {
            self.dispatch_pending(&mut summary)?;
        }

        self.observer.on_cycle_end(self.clock.now(), &summary);
        Ok(summary)
    }

    /// The battery governance pass on its own.
    pub fn govern_batteries(&mut self) -> DispatchResult<CycleSummary> {
        let now = self.clock.now();
        let rate = self.config.recharge_rate;
        let mut summary = CycleSummary::default();

        for idx in 0..self.fleet.vehicles().len() {
            let vehicle = &mut self.fleet.vehicles_mut()[idx];
            let state = vehicle.state;
            match state {
                VehicleState::Charging => {
                    if vehicle.advance_charge(now, rate)? {
                        let id = vehicle.id.clone();
                        summary.recharged += 1;
                        self.emit(FleetEvent::ChargingFinished { vehicle: id });
                    }
                }
                VehicleState::Idle => {
                    if vehicle.is_critical() {
                        vehicle.start_charging(now)?;
                        let (id, battery) = (vehicle.id.clone(), vehicle.battery);
                        summary.charging_started += 1;
                        self.emit(FleetEvent::ChargingStarted { vehicle: id, battery });
                    }
                }
                // Already heading home.
                VehicleState::Returning => {}
                VehicleState::Loading | VehicleState::InFlight | VehicleState::Delivering => {
                    let trigger = if vehicle.is_critical() {
                        Some(ReturnTrigger::Critical)
                    } else if vehicle.is_low()
                        && !sufficient_for_return(vehicle.battery, vehicle.distance_to_depot())
                    {
                        Some(ReturnTrigger::LowReserve)
                    } else {
                        None
                    };
                    if let Some(trigger) = trigger {
                        self.return_to_depot(idx, trigger)?;
                        summary.emergency_returns += 1;
                    }
                }
            }
        }
        Ok(summary)
    }

    fn dispatch_pending(&mut self, summary: &mut CycleSummary) -> DispatchResult<()> {
        let zones = self.fleet.zones();
        let mut eligible = Vec::with_capacity(self.fleet.queue().len());
        for order in self.fleet.queue().iter() {
            if zones.blocks(GridPoint::DEPOT, order.destination) {
                summary.blocked += 1;
            } else {
                eligible.push(order.clone());
            }
        }

        let batches = {
            let idle: Vec<_> = self.fleet.vehicles().iter().filter(|v| v.is_idle()).collect();
            self.allocator.allocate(&idle, &eligible)
        };

        if summary.blocked > 0 {
            self.emit(FleetEvent::OrdersBlocked { count: summary.blocked });
        }

        for batch in batches {
            if batch.is_empty() {
                continue;
            }
            let Some(idx) = self.fleet.vehicles().iter().position(|v| v.id == batch.vehicle) else {
                continue;
            };
            let (start, battery) = {
                let v = &self.fleet.vehicles()[idx];
                (v.position, v.battery)
            };

            let weight = batch.total_weight();
            let orders = self.allocator.sequence(batch.orders, start);
            let projected = round_trip_distance(start, &orders);

            if !safe_for_mission(battery, projected, weight) {
                summary.deferred += 1;
                self.emit(FleetEvent::BatchDeferred {
                    vehicle:            batch.vehicle,
                    orders:             orders.len(),
                    battery,
                    projected_distance: projected,
                });
                continue;
            }

            let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
            self.fleet.take_orders(&ids);

            let outcome = self.fly_mission(idx, orders)?;
            summary.missions += 1;
            summary.delivered += outcome.delivered;
            if outcome.dropped > 0 {
                summary.aborted += 1;
                summary.dropped += outcome.dropped;
            }
        }
        Ok(())
    }

    /// Fly an admitted, sequenced batch with vehicle `idx`, then bring it home.
    fn fly_mission(&mut self, idx: usize, orders: Vec<Order>) -> DispatchResult<MissionOutcome> {
        let now = self.clock.now();
        let Self { fleet, config, planner, rng, observer, .. } = self;
        let parts = fleet.parts_mut();
        let vehicle = &mut parts.vehicles[idx];

        vehicle.transition(VehicleState::Loading)?;
        vehicle.orders = orders;
        observer.on_event(now, &FleetEvent::MissionStarted {
            vehicle: vehicle.id.clone(),
            orders:  vehicle.orders.len(),
            payload: vehicle.payload(),
        });
        let mut sim_time = after_minutes(now, config.loading_minutes);
        vehicle.transition(VehicleState::InFlight)?;

        let mut delivered = 0;
        let mut dropped = 0;

        while let Some(order) = vehicle.orders.first().cloned() {
            if vehicle.state == VehicleState::Delivering {
                vehicle.transition(VehicleState::InFlight)?;
            }

            let from = vehicle.position;
            let route = planner.plan(from, order.destination, parts.zones.as_slice(), config.grid_limit);
            let distance = route.total_distance();
            let minutes = config.flight_minutes(distance);
            let adverse = rng.chance(config.adverse_probability);
            // Weight still on board for this leg.
            let used = consumption(distance, vehicle.payload(), adverse);

            if !sufficient_for_return(vehicle.battery - used, order.destination.distance_to_depot()) {
                dropped = vehicle.orders.len();
                vehicle.orders.clear();
                observer.on_event(now, &FleetEvent::MissionAborted {
                    vehicle: vehicle.id.clone(),
                    dropped,
                    battery: vehicle.battery,
                });
                break;
            }

            if let Some(waypoint) = route.waypoint() {
                observer.on_event(now, &FleetEvent::DetourTaken {
                    vehicle:         vehicle.id.clone(),
                    order:           order.id,
                    waypoint,
                    distance,
                    direct_distance: from.distance(order.destination),
                });
            }

            vehicle.consume(used);
            vehicle.position = order.destination;
            vehicle.transition(VehicleState::Delivering)?;
            vehicle.orders.remove(0);

            let started_at = sim_time;
            sim_time = after_minutes(sim_time, minutes + config.delivery_minutes);

            observer.on_event(now, &FleetEvent::OrderDelivered {
                vehicle:      vehicle.id.clone(),
                order:        order.id,
                distance,
                minutes,
                battery_used: used,
                adverse,
            });
            parts.history.record(Delivery {
                vehicle:      vehicle.id.clone(),
                order,
                distance,
                minutes,
                battery_used: used,
                started_at,
                completed_at: sim_time,
            });
            delivered += 1;
        }

        vehicle.transition(VehicleState::Returning)?;
        vehicle.consume(consumption(vehicle.distance_to_depot(), 0.0, false));
        vehicle.position = GridPoint::DEPOT;
        if vehicle.is_low() {
            vehicle.start_charging(now)?;
        } else {
            vehicle.transition(VehicleState::Idle)?;
        }

        observer.on_event(now, &FleetEvent::MissionCompleted {
            vehicle: vehicle.id.clone(),
            delivered,
            battery: vehicle.battery,
            state:   vehicle.state,
        });
        Ok(MissionOutcome { delivered, dropped })
    }

    /// Emergency return of vehicle `idx`: drop its orders, fly home
    /// unloaded, then charge.
    ///
    /// Automatic returns go idle instead of charging if the battery is no
    /// longer low on arrival; manual returns always dock.
    fn return_to_depot(&mut self, idx: usize, trigger: ReturnTrigger) -> DispatchResult<()> {
        let now = self.clock.now();
        let vehicle = &mut self.fleet.vehicles_mut()[idx];
        let battery = vehicle.battery;

        vehicle.orders.clear();
        if vehicle.state != VehicleState::Returning {
            vehicle.transition(VehicleState::Returning)?;
        }
        vehicle.consume(consumption(vehicle.distance_to_depot(), 0.0, false));
        vehicle.position = GridPoint::DEPOT;
        if trigger == ReturnTrigger::Manual || vehicle.is_low() {
            vehicle.start_charging(now)?;
        } else {
            vehicle.transition(VehicleState::Idle)?;
        }

        let id = vehicle.id.clone();
        self.emit(FleetEvent::EmergencyReturn { vehicle: id, battery, trigger });
        Ok(())
    }

    // ── Operator actions ──────────────────────────────────────────────────

    /// Force an emergency return.  Refused for vehicles already at the
    /// depot (idle or charging).
    pub fn force_return(&mut self, id: &VehicleId) -> DispatchResult<()> {
        let idx = self.vehicle_index(id)?;
        let vehicle = &self.fleet.vehicles()[idx];
        if matches!(vehicle.state, VehicleState::Idle | VehicleState::Charging) {
            return Err(FleetError::IllegalState {
                vehicle: vehicle.id.clone(),
                state:   vehicle.state,
                action:  "recall",
            }
            .into());
        }
        self.return_to_depot(idx, ReturnTrigger::Manual)
    }

    /// Set one vehicle's battery to 100% immediately.  A charging vehicle
    /// leaves the charger.
    pub fn recharge_vehicle(&mut self, id: &VehicleId) -> DispatchResult<()> {
        let idx = self.vehicle_index(id)?;
        self.recharge_at(idx)
    }

    /// [`recharge_vehicle`](Self::recharge_vehicle) for every vehicle.
    pub fn recharge_all(&mut self) -> DispatchResult<usize> {
        let count = self.fleet.vehicles().len();
        for idx in 0..count {
            self.recharge_at(idx)?;
        }
        Ok(count)
    }

    fn recharge_at(&mut self, idx: usize) -> DispatchResult<()> {
        let vehicle = &mut self.fleet.vehicles_mut()[idx];
        if vehicle.is_charging() {
            vehicle.finish_charging()?;
        }
        vehicle.set_battery(dd_battery::FULL);
        let id = vehicle.id.clone();
        self.emit(FleetEvent::Recharged { vehicle: id });
        Ok(())
    }

    fn vehicle_index(&self, id: &VehicleId) -> DispatchResult<usize> {
        self.fleet
            .vehicles()
            .iter()
            .position(|v| &v.id == id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()).into())
    }
}

/// `t` plus a fractional number of minutes, at millisecond resolution.
fn after_minutes(t: Timestamp, minutes: f64) -> Timestamp {
    t + Duration::milliseconds((minutes.max(0.0) * 60_000.0).round() as i64)
}
