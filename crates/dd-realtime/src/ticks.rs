//! Bodies of the periodic ticks, as plain functions over a locked
//! [`Dispatcher`] so they can be tested without a runtime.

use dd_core::{VehicleId, VehicleState};
use dd_dispatch::{CycleSummary, DispatchResult, Dispatcher, FleetEvent};

use crate::SchedulerConfig;

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Run one cycle iff the queue is non-empty.
pub fn dispatch_tick(dispatcher: &mut Dispatcher) -> DispatchResult<Option<CycleSummary>> {
    if dispatcher.fleet().queue().is_empty() {
        return Ok(None);
    }
    dispatcher.run_cycle().map(Some)
}

// ── Degradation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DegradationSummary {
    pub drained:   usize,
    /// Airborne vehicles that fell under the floor and were reset.
    pub recovered: usize,
}

/// Background drain.
///
/// Full vehicles are untouched.  Airborne vehicles lose `airborne_drain`;
/// one that drops under `battery_floor` is put back at the depot, idle and
/// full, dropping its orders.  Idle vehicles under `idle_drain_below` lose
/// `idle_drain`.  A vehicle never drains if it has no more than the drain
/// amount left.  Loading and charging vehicles are skipped.
pub fn degrade(
    dispatcher: &mut Dispatcher,
    config: &SchedulerConfig,
) -> DispatchResult<DegradationSummary> {
    let mut summary = DegradationSummary::default();
    let mut recovered = Vec::new();

    for vehicle in dispatcher.fleet_mut().vehicles_mut() {
        if vehicle.battery >= dd_battery::FULL {
            continue;
        }
        if vehicle.state.is_airborne() {
            if vehicle.battery <= config.airborne_drain {
                continue;
            }
            vehicle.consume(config.airborne_drain);
            summary.drained += 1;
            if vehicle.battery < config.battery_floor {
                let battery = vehicle.battery;
                vehicle.recall_to_depot()?;
                vehicle.set_battery(dd_battery::FULL);
                recovered.push((vehicle.id.clone(), battery));
            }
        } else if vehicle.state == VehicleState::Idle
            && vehicle.battery < config.idle_drain_below
            && vehicle.battery > config.idle_drain
        {
            vehicle.consume(config.idle_drain);
            summary.drained += 1;
        }
    }

    summary.recovered = recovered.len();
    for (vehicle, battery) in recovered {
        dispatcher.emit(FleetEvent::FloorRecovery { vehicle, battery });
    }
    Ok(summary)
}

// ── Random events ─────────────────────────────────────────────────────────────

/// What a random-event tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum RandomEvent {
    /// Every vehicle that was not idle was recalled.
    Storm { recalled: usize },
    /// One vehicle that was not idle failed and was recalled with a penalty.
    Failure { vehicle: VehicleId, battery_before: f64, battery_after: f64 },
    /// A failure was drawn but every vehicle was idle.
    FailureSkipped,
    HighDemand,
    Quiet,
}

/// Draw once from the dispatcher's random source and apply the outcome.
///
/// Storms and failures hit every state except `Idle`, so charging vehicles
/// are undocked too.  Recalled vehicles end up idle at the depot with their
/// orders dropped.
pub fn random_event(
    dispatcher: &mut Dispatcher,
    config: &SchedulerConfig,
) -> DispatchResult<RandomEvent> {
    let roll = dispatcher.rng_mut().next_f64();

    if roll < config.storm_below {
        let mut recalled = 0;
        for vehicle in dispatcher.fleet_mut().vehicles_mut() {
            if vehicle.state != VehicleState::Idle {
                vehicle.recall_to_depot()?;
                recalled += 1;
            }
        }
        dispatcher.emit(FleetEvent::StormRecall { vehicles: recalled });
        return Ok(RandomEvent::Storm { recalled });
    }

    if roll < config.failure_below {
        let busy: Vec<usize> = dispatcher
            .fleet()
            .vehicles()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state != VehicleState::Idle)
            .map(|(i, _)| i)
            .collect();
        if busy.is_empty() {
            return Ok(RandomEvent::FailureSkipped);
        }
        let pick = busy[dispatcher.rng_mut().pick_index(busy.len())];

        let vehicle = &mut dispatcher.fleet_mut().vehicles_mut()[pick];
        let before = vehicle.battery;
        let penalty = if before > config.failure_penalty { config.failure_penalty } else { before * 0.5 };
        vehicle.recall_to_depot()?;
        vehicle.consume(penalty);
        let (id, after) = (vehicle.id.clone(), vehicle.battery);

        dispatcher.emit(FleetEvent::VehicleFailure {
            vehicle:        id.clone(),
            battery_before: before,
            battery_after:  after,
        });
        return Ok(RandomEvent::Failure { vehicle: id, battery_before: before, battery_after: after });
    }

    if roll < config.high_demand_below {
        dispatcher.emit(FleetEvent::HighDemand);
        return Ok(RandomEvent::HighDemand);
    }

    Ok(RandomEvent::Quiet)
}
