//! Tests for the dispatch cycle, operator actions and reports.

use dd_core::{GridPoint, ManualClock, Priority, ScriptedRandom, VehicleId, VehicleState};
use dd_fleet::{Fleet, FleetBuilder, FleetError, OrderRequest, OrderStatus};

use crate::{
    DispatchConfig, DispatchError, Dispatcher, DispatcherBuilder, FleetEvent, RecordingObserver,
    ReturnTrigger,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Draw that never triggers adverse conditions.
const CALM: f64 = 0.99;
/// Draw that always triggers adverse conditions.
const ROUGH: f64 = 0.0;

struct Harness {
    dispatcher: Dispatcher,
    events:     RecordingObserver,
    clock:      ManualClock,
}

fn harness_with(fleet: Fleet, draws: Vec<f64>) -> Harness {
    let events = RecordingObserver::new();
    let clock = ManualClock::at_epoch();
    let dispatcher = DispatcherBuilder::new(fleet)
        .rng(ScriptedRandom::new(draws, CALM))
        .clock(clock.clone())
        .observer(events.clone())
        .build()
        .unwrap();
    Harness { dispatcher, events, clock }
}

fn harness(fleet: Fleet) -> Harness {
    harness_with(fleet, Vec::new())
}

fn one_drone() -> Fleet {
    FleetBuilder::new().vehicle("D1", 10.0, 100.0).build().unwrap()
}

fn req(x: i32, y: i32, weight: f64, priority: Priority) -> OrderRequest {
    OrderRequest::new("customer", GridPoint::new(x, y), weight, priority)
}

fn d1() -> VehicleId {
    VehicleId::from("D1")
}

fn put_in_flight(d: &mut Dispatcher, id: &VehicleId, at: GridPoint, battery: f64) {
    let v = d.fleet_mut().vehicle_mut(id).unwrap();
    v.transition(VehicleState::Loading).unwrap();
    v.transition(VehicleState::InFlight).unwrap();
    v.position = at;
    v.set_battery(battery);
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── End-to-end ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod end_to_end {
    use super::*;

    #[test]
    fn single_order_is_delivered() {
        let mut h = harness(one_drone());
        h.dispatcher.submit_order(req(3, 4, 5.0, Priority::High)).unwrap();

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.missions, 1);
        assert_eq!(summary.delivered, 1);

        let fleet = h.dispatcher.fleet();
        assert_eq!(fleet.history().len(), 1);
        let delivery = &fleet.history().as_slice()[0];
        assert!(close(delivery.distance, 5.0));
        assert!(close(delivery.minutes, 10.0));
        assert_eq!(delivery.vehicle, "D1");

        let v = fleet.find_vehicle(&d1()).unwrap();
        assert_eq!(v.position, GridPoint::DEPOT);
        assert_eq!(v.state, VehicleState::Idle);
        assert!(v.orders.is_empty());
        // 5 units loaded (5 · 0.5 · 1.25) plus 5 units home unloaded.
        assert!(close(v.battery, 100.0 - 3.125 - 2.5));
        assert!(fleet.queue().is_empty());
    }

    #[test]
    fn adverse_leg_costs_more() {
        let mut h = harness_with(one_drone(), vec![ROUGH]);
        h.dispatcher.submit_order(req(3, 4, 5.0, Priority::High)).unwrap();
        h.dispatcher.run_cycle().unwrap();

        let delivery = &h.dispatcher.fleet().history().as_slice()[0];
        assert!(close(delivery.battery_used, 3.125 * 1.3));
    }

    #[test]
    fn delivery_timestamps_follow_simulated_time() {
        let mut h = harness(one_drone());
        let id = h.dispatcher.submit_order(req(3, 4, 5.0, Priority::High)).unwrap();
        h.dispatcher.run_cycle().unwrap();

        let delivery = &h.dispatcher.fleet().history().as_slice()[0];
        let epoch = h.dispatcher.now();
        assert_eq!((delivery.started_at - epoch).num_milliseconds(), 6_000);
        assert_eq!((delivery.completed_at - delivery.started_at).num_milliseconds(), 603_000);
        assert_eq!(
            h.dispatcher.order_status(id),
            OrderStatus::Delivered { vehicle: d1(), at: delivery.completed_at }
        );
    }

    #[test]
    fn mission_events_in_order() {
        let mut h = harness(one_drone());
        h.dispatcher.submit_order(req(3, 4, 5.0, Priority::High)).unwrap();
        h.dispatcher.run_cycle().unwrap();
        assert_eq!(
            h.events.kinds(),
            vec!["order_queued", "mission_started", "order_delivered", "mission_completed"]
        );
    }

    #[test]
    fn empty_queue_runs_governance_only() {
        let mut h = harness(one_drone());
        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary, Default::default());
        assert!(h.events.events().is_empty());
    }

    #[test]
    fn multi_drop_mission_goes_by_priority_then_nearest() {
        let mut h = harness(one_drone());
        let low = h.dispatcher.submit_order(req(1, 0, 2.0, Priority::Low)).unwrap();
        let high_far = h.dispatcher.submit_order(req(9, 0, 2.0, Priority::High)).unwrap();
        let high_near = h.dispatcher.submit_order(req(4, 0, 2.0, Priority::High)).unwrap();
        h.dispatcher.run_cycle().unwrap();

        let delivered: Vec<_> =
            h.dispatcher.fleet().history().iter().map(|d| d.order.id).collect();
        assert_eq!(delivered, vec![high_near, high_far, low]);
        // Second leg is (4,0) → (9,0).
        assert!(close(h.dispatcher.fleet().history().as_slice()[1].distance, 5.0));
    }

    #[test]
    fn work_is_split_across_vehicles() {
        let fleet = FleetBuilder::new()
            .vehicle("A", 5.0, 100.0)
            .vehicle("B", 5.0, 100.0)
            .build()
            .unwrap();
        let mut h = harness(fleet);
        h.dispatcher.submit_order(req(1, 1, 4.0, Priority::High)).unwrap();
        h.dispatcher.submit_order(req(2, 2, 4.0, Priority::High)).unwrap();
        h.dispatcher.submit_order(req(3, 3, 4.0, Priority::High)).unwrap();

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.missions, 2);
        assert_eq!(summary.delivered, 2);
        assert_eq!(h.dispatcher.fleet().queue().len(), 1);
        assert_eq!(h.dispatcher.fleet().queue().as_slice()[0].destination, GridPoint::new(3, 3));

        h.dispatcher.run_cycle().unwrap();
        assert!(h.dispatcher.fleet().queue().is_empty());
        assert_eq!(h.dispatcher.statistics().busiest_vehicle, Some(VehicleId::from("A")));
    }
}

// ── Admission and aborts ──────────────────────────────────────────────────────

#[cfg(test)]
mod admission {
    use super::*;

    #[test]
    fn critical_idle_vehicle_docks_instead_of_flying() {
        let mut h = harness(one_drone());
        h.dispatcher.submit_order(req(50, 50, 5.0, Priority::High)).unwrap();
        h.dispatcher.fleet_mut().vehicle_mut(&d1()).unwrap().set_battery(10.0);

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.charging_started, 1);
        assert_eq!(summary.missions, 0);

        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert!(matches!(v.state, VehicleState::Charging | VehicleState::Idle));
        assert_eq!(h.dispatcher.fleet().queue().len(), 1);
        assert!(h.dispatcher.fleet().history().is_empty());
    }

    #[test]
    fn unsafe_batch_stays_queued() {
        let mut h = harness(one_drone());
        let id = h.dispatcher.submit_order(req(50, 50, 5.0, Priority::High)).unwrap();
        h.dispatcher.fleet_mut().vehicle_mut(&d1()).unwrap().set_battery(30.0);

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.deferred, 1);
        assert_eq!(summary.missions, 0);
        assert_eq!(h.dispatcher.order_status(id), OrderStatus::Queued { position: 1 });

        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert_eq!(v.state, VehicleState::Idle);
        assert_eq!(v.battery, 30.0);
        assert_eq!(h.events.count("batch_deferred"), 1);
    }

    #[test]
    fn mid_route_abort_drops_rest_of_batch() {
        // Round trip (30,0) → (0,30) → depot is ~102.4 units; at weight 2
        // that projects to ~56.3%, so 62% is admitted.  The second leg flies
        // in adverse weather and would leave under the return margin.
        let mut h = harness_with(one_drone(), vec![CALM, ROUGH]);
        let first = h.dispatcher.submit_order(req(30, 0, 1.0, Priority::High)).unwrap();
        let second = h.dispatcher.submit_order(req(0, 30, 1.0, Priority::High)).unwrap();
        h.dispatcher.fleet_mut().vehicle_mut(&d1()).unwrap().set_battery(62.0);

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.missions, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.aborted, 1);
        assert_eq!(summary.dropped, 1);

        assert!(matches!(h.dispatcher.order_status(first), OrderStatus::Delivered { .. }));
        assert_eq!(h.dispatcher.order_status(second), OrderStatus::NotFound);
        assert!(h.dispatcher.fleet().queue().is_empty());

        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert_eq!(v.position, GridPoint::DEPOT);
        // 62 − 16.5 out − 15 home.
        assert!(close(v.battery, 30.5));
        assert_eq!(v.state, VehicleState::Idle);
        assert_eq!(h.events.count("mission_aborted"), 1);
    }

    #[test]
    fn oversized_order_waits_forever() {
        let mut h = harness(one_drone());
        h.dispatcher.submit_order(req(1, 1, 50.0, Priority::High)).unwrap();
        for _ in 0..3 {
            let summary = h.dispatcher.run_cycle().unwrap();
            assert_eq!(summary.missions, 0);
        }
        assert_eq!(h.dispatcher.fleet().queue().len(), 1);
    }

    #[test]
    fn low_battery_after_mission_starts_charging() {
        let mut h = harness(one_drone());
        h.dispatcher.submit_order(req(6, 8, 1.0, Priority::High)).unwrap();
        h.dispatcher.fleet_mut().vehicle_mut(&d1()).unwrap().set_battery(25.0);
        h.dispatcher.run_cycle().unwrap();

        // 10 out at 1.05 = 5.25, 10 home = 5: 14.75% left.
        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert!(close(v.battery, 14.75));
        assert_eq!(v.state, VehicleState::Charging);
    }
}

// ── Zones ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod zones {
    use super::*;

    #[test]
    fn order_behind_zone_not_allocated() {
        let mut h = harness(one_drone());
        h.dispatcher
            .fleet_mut()
            .add_zone(GridPoint::new(5, 5), GridPoint::new(15, 15), "Airport", "air traffic");
        h.dispatcher.submit_order(req(20, 20, 1.0, Priority::High)).unwrap();

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.missions, 0);
        assert_eq!(h.dispatcher.fleet().queue().len(), 1);
    }

    #[test]
    fn order_inside_zone_rejected_with_event() {
        let mut h = harness(one_drone());
        h.dispatcher
            .fleet_mut()
            .add_zone(GridPoint::new(5, 5), GridPoint::new(15, 15), "Airport", "air traffic");
        let err = h.dispatcher.submit_order(req(10, 10, 1.0, Priority::High)).unwrap_err();
        assert!(matches!(err, DispatchError::Fleet(FleetError::ValidationRejected { .. })));
        assert_eq!(h.events.kinds(), vec!["order_rejected"]);
    }

    #[test]
    fn later_leg_detours_around_zone() {
        // Both depot lines are clear; the (20,0) → (0,20) leg is not.
        let mut h = harness(one_drone());
        h.dispatcher
            .fleet_mut()
            .add_zone(GridPoint::new(8, 2), GridPoint::new(12, 16), "Stadium", "event");
        h.dispatcher.submit_order(req(20, 0, 1.0, Priority::High)).unwrap();
        h.dispatcher.submit_order(req(0, 20, 1.0, Priority::High)).unwrap();

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.delivered, 2);

        let detours: Vec<_> = h
            .events
            .events()
            .into_iter()
            .filter_map(|e| match e {
                FleetEvent::DetourTaken { waypoint, .. } => Some(waypoint),
                _ => None,
            })
            .collect();
        assert_eq!(detours, vec![GridPoint::new(6, 18)]);

        let second = &h.dispatcher.fleet().history().as_slice()[1];
        assert!(second.distance > 800.0_f64.sqrt());
    }

    #[test]
    fn route_report_compares_with_direct() {
        let mut h = harness(one_drone());
        h.dispatcher
            .fleet_mut()
            .add_zone(GridPoint::new(5, 5), GridPoint::new(15, 15), "Airport", "air traffic");

        let report = h.dispatcher.route_report(GridPoint::new(0, 0), GridPoint::new(20, 20));
        assert_eq!(report.route.points.len(), 3);
        assert!(report.detour_needed);
        assert!(report.intersects_zone);
        assert_eq!(report.intersected_zones, vec!["Airport".to_string()]);
        assert_eq!(report.direct_distance, 28.3);
        assert!(report.route_distance >= report.direct_distance);
    }

    #[test]
    fn route_report_without_zones_is_direct() {
        let h = harness(one_drone());
        let report = h.dispatcher.route_report(GridPoint::new(0, 0), GridPoint::new(3, 4));
        assert!(!report.detour_needed);
        assert!(!report.intersects_zone);
        assert_eq!(report.route_distance, 5.0);
        assert_eq!(report.extra_distance, 0.0);
    }
}

// ── Governance ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod governance {
    use super::*;

    #[test]
    fn critical_vehicle_in_flight_returns_and_charges() {
        let mut h = harness(one_drone());
        put_in_flight(&mut h.dispatcher, &d1(), GridPoint::new(10, 10), 8.0);

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.emergency_returns, 1);

        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert_eq!(v.state, VehicleState::Charging);
        assert_eq!(v.position, GridPoint::DEPOT);
        assert!(v.orders.is_empty());
        assert!(v.battery < 8.0);
        assert!(matches!(
            h.events.events()[0],
            FleetEvent::EmergencyReturn { trigger: ReturnTrigger::Critical, .. }
        ));
    }

    #[test]
    fn low_vehicle_without_reserve_returns() {
        let mut h = harness(one_drone());
        put_in_flight(&mut h.dispatcher, &d1(), GridPoint::new(30, 40), 15.0);

        h.dispatcher.run_cycle().unwrap();
        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert_eq!(v.state, VehicleState::Charging);
        assert_eq!(v.battery, 0.0);
        assert!(matches!(
            h.events.events()[0],
            FleetEvent::EmergencyReturn { trigger: ReturnTrigger::LowReserve, .. }
        ));
    }

    #[test]
    fn low_vehicle_close_to_home_keeps_flying() {
        let mut h = harness(one_drone());
        put_in_flight(&mut h.dispatcher, &d1(), GridPoint::new(3, 4), 18.0);

        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.emergency_returns, 0);
        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert_eq!(v.state, VehicleState::InFlight);
    }

    #[test]
    fn charging_progresses_with_time_and_exits_at_full() {
        let mut h = harness(one_drone());
        {
            let now = h.dispatcher.now();
            let v = h.dispatcher.fleet_mut().vehicle_mut(&d1()).unwrap();
            v.set_battery(40.0);
            v.start_charging(now).unwrap();
        }

        h.clock.advance_minutes(20);
        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.recharged, 0);
        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert!(close(v.battery, 70.0));
        assert_eq!(v.state, VehicleState::Charging);

        h.clock.advance_minutes(20);
        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.recharged, 1);
        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert_eq!(v.battery, 100.0);
        assert_eq!(v.state, VehicleState::Idle);
        assert_eq!(h.events.count("charging_finished"), 1);
    }

    #[test]
    fn charging_vehicle_is_not_allocated() {
        let mut h = harness(one_drone());
        {
            let now = h.dispatcher.now();
            let v = h.dispatcher.fleet_mut().vehicle_mut(&d1()).unwrap();
            v.set_battery(50.0);
            v.start_charging(now).unwrap();
        }
        h.dispatcher.submit_order(req(1, 1, 1.0, Priority::High)).unwrap();
        let summary = h.dispatcher.run_cycle().unwrap();
        assert_eq!(summary.missions, 0);
        assert_eq!(h.dispatcher.fleet().queue().len(), 1);
    }
}

// ── Operator actions ──────────────────────────────────────────────────────────

#[cfg(test)]
mod operator {
    use super::*;

    #[test]
    fn manual_return_always_docks() {
        let mut h = harness(one_drone());
        put_in_flight(&mut h.dispatcher, &d1(), GridPoint::new(10, 10), 100.0);

        h.dispatcher.force_return(&d1()).unwrap();
        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert_eq!(v.state, VehicleState::Charging);
        assert_eq!(v.position, GridPoint::DEPOT);
    }

    #[test]
    fn manual_return_refused_at_depot() {
        let mut h = harness(one_drone());
        let err = h.dispatcher.force_return(&d1()).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Fleet(FleetError::IllegalState { action: "recall", .. })
        ));
        let err = h.dispatcher.force_return(&"nobody".into()).unwrap_err();
        assert!(matches!(err, DispatchError::Fleet(FleetError::VehicleNotFound(_))));
    }

    #[test]
    fn recharge_forces_full_and_undocks() {
        let mut h = harness(one_drone());
        {
            let now = h.dispatcher.now();
            let v = h.dispatcher.fleet_mut().vehicle_mut(&d1()).unwrap();
            v.set_battery(12.0);
            v.start_charging(now).unwrap();
        }
        h.dispatcher.recharge_vehicle(&d1()).unwrap();
        let v = h.dispatcher.fleet().find_vehicle(&d1()).unwrap();
        assert_eq!(v.battery, 100.0);
        assert_eq!(v.state, VehicleState::Idle);
    }

    #[test]
    fn recharge_all_touches_every_vehicle() {
        let fleet = FleetBuilder::new()
            .vehicle("A", 5.0, 100.0)
            .vehicle("B", 5.0, 100.0)
            .build()
            .unwrap();
        let mut h = harness(fleet);
        for v in h.dispatcher.fleet_mut().vehicles_mut() {
            v.set_battery(33.0);
        }
        assert_eq!(h.dispatcher.recharge_all().unwrap(), 2);
        assert!(h.dispatcher.fleet().vehicles().iter().all(|v| v.battery == 100.0));
        assert_eq!(h.events.count("recharged"), 2);
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reports {
    use super::*;

    #[test]
    fn statistics_empty() {
        let h = harness(one_drone());
        let stats = h.dispatcher.statistics();
        assert_eq!(stats.total_deliveries, 0);
        assert_eq!(stats.total_vehicles, 1);
        assert_eq!(stats.mean_delivery_minutes, 0.0);
        assert_eq!(stats.busiest_vehicle, None);
    }

    #[test]
    fn statistics_after_deliveries() {
        let mut h = harness(one_drone());
        h.dispatcher.submit_order(req(3, 4, 1.0, Priority::High)).unwrap();
        h.dispatcher.submit_order(req(6, 8, 1.0, Priority::Low)).unwrap();
        h.dispatcher.submit_order(req(1, 1, 50.0, Priority::Low)).unwrap();
        h.dispatcher.run_cycle().unwrap();

        let stats = h.dispatcher.statistics();
        assert_eq!(stats.total_deliveries, 2);
        assert_eq!(stats.queued_orders, 1);
        // Legs of 5 and 5 units at 30 units/h.
        assert_eq!(stats.mean_delivery_minutes, 10.0);
        assert_eq!(stats.busiest_vehicle, Some(d1()));
    }

    #[test]
    fn battery_snapshot_counts() {
        let fleet = FleetBuilder::new()
            .vehicle("D1", 10.0, 100.0)
            .vehicle("D2", 10.0, 100.0)
            .vehicle("D3", 10.0, 100.0)
            .build()
            .unwrap();
        let mut h = harness(fleet);
        let now = h.dispatcher.now();
        let f = h.dispatcher.fleet_mut();
        f.vehicle_mut(&"D1".into()).unwrap().set_battery(15.0);
        f.vehicle_mut(&"D2".into()).unwrap().set_battery(5.0);
        f.vehicle_mut(&"D3".into()).unwrap().start_charging(now).unwrap();
        h.clock.advance_minutes(3);

        let snap = h.dispatcher.battery_snapshot();
        assert_eq!(snap.total_vehicles, 3);
        assert_eq!(snap.low_battery, 2);
        assert_eq!(snap.charging, 1);
        assert!(snap.vehicles[1].critical);
        assert_eq!(snap.vehicles[2].charging_minutes, Some(3.0));
        assert_eq!(snap.vehicles[0].charging_minutes, None);
    }

    #[test]
    fn fleet_report_renders_every_vehicle() {
        let h = harness(one_drone());
        let text = h.dispatcher.report().to_string();
        assert!(text.contains("vehicles: 1"));
        assert!(text.contains("D1"));
        assert!(text.contains("IDLE"));
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;

    #[test]
    fn invalid_config_rejected() {
        let config = DispatchConfig { cruise_speed: 0.0, ..Default::default() };
        let result = DispatcherBuilder::new(Fleet::new()).config(config).build();
        assert!(matches!(result, Err(DispatchError::Core(dd_core::CoreError::Config(_)))));
    }

    #[test]
    fn adverse_probability_bounds() {
        let config = DispatchConfig { adverse_probability: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
        assert!(DispatchConfig::default().validate().is_ok());
    }
}
