//! Unit tests for allocation and sequencing.

use dd_core::{GridPoint, Priority, Timestamp};
use dd_fleet::{Order, OrderRequest, Vehicle};

use crate::{round_trip_distance, Allocator, PriorityAllocator};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn order(x: i32, y: i32, weight: f64, priority: Priority) -> Order {
    Order::new(
        OrderRequest::new("c", GridPoint::new(x, y), weight, priority),
        Timestamp::default(),
    )
}

fn vehicle(id: &str, capacity: f64) -> Vehicle {
    Vehicle::new(id.into(), capacity, 100.0)
}

fn dests(orders: &[Order]) -> Vec<(i32, i32)> {
    orders.iter().map(|o| (o.destination.x, o.destination.y)).collect()
}

// ── allocate ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod allocate {
    use super::*;

    #[test]
    fn fills_first_vehicle_first() {
        let v1 = vehicle("A", 10.0);
        let v2 = vehicle("B", 10.0);
        let pending = vec![
            order(1, 0, 4.0, Priority::High),
            order(2, 0, 4.0, Priority::High),
            order(3, 0, 4.0, Priority::High),
        ];
        let batches = PriorityAllocator.allocate(&[&v1, &v2], &pending);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].vehicle, "A");
        assert_eq!(dests(&batches[0].orders), vec![(1, 0), (2, 0)]);
        assert_eq!(dests(&batches[1].orders), vec![(3, 0)]);
    }

    #[test]
    fn skips_orders_that_do_not_fit() {
        let v = vehicle("A", 10.0);
        let pending = vec![
            order(1, 0, 6.0, Priority::High),
            order(2, 0, 7.0, Priority::High),
            order(3, 0, 4.0, Priority::Low),
        ];
        let batches = PriorityAllocator.allocate(&[&v], &pending);
        assert_eq!(dests(&batches[0].orders), vec![(1, 0), (3, 0)]);
        assert_eq!(batches[0].total_weight(), 10.0);
    }

    #[test]
    fn skipped_order_goes_to_next_vehicle() {
        let small = vehicle("S", 5.0);
        let big = vehicle("B", 20.0);
        let pending = vec![order(1, 0, 8.0, Priority::High), order(2, 0, 3.0, Priority::High)];
        let batches = PriorityAllocator.allocate(&[&small, &big], &pending);
        assert_eq!(dests(&batches[0].orders), vec![(2, 0)]);
        assert_eq!(dests(&batches[1].orders), vec![(1, 0)]);
    }

    #[test]
    fn oversized_order_never_allocated() {
        let v1 = vehicle("A", 10.0);
        let v2 = vehicle("B", 12.0);
        let pending = vec![order(1, 0, 50.0, Priority::High)];
        let batches = PriorityAllocator.allocate(&[&v1, &v2], &pending);
        assert!(batches.iter().all(|b| b.is_empty()));
    }

    #[test]
    fn each_order_in_at_most_one_batch() {
        let fleet: Vec<_> = (0..4).map(|i| vehicle(&format!("V{i}"), 7.0)).collect();
        let refs: Vec<&Vehicle> = fleet.iter().collect();
        let pending: Vec<_> = (0..10).map(|i| order(i, i, 2.5, Priority::Medium)).collect();
        let batches = PriorityAllocator.allocate(&refs, &pending);

        let mut seen: Vec<_> = batches.iter().flat_map(|b| b.orders.iter().map(|o| o.id)).collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
        for (b, v) in batches.iter().zip(&fleet) {
            assert!(b.total_weight() <= v.capacity);
        }
    }

    #[test]
    fn no_vehicles_no_batches() {
        let pending = vec![order(1, 0, 1.0, Priority::High)];
        assert!(PriorityAllocator.allocate(&[], &pending).is_empty());
    }
}

// ── sequence ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sequence {
    use super::*;

    #[test]
    fn priority_tier_comes_first() {
        let batch = vec![
            order(1, 0, 1.0, Priority::Low),
            order(50, 0, 1.0, Priority::High),
            order(2, 0, 1.0, Priority::Medium),
        ];
        let seq = PriorityAllocator.sequence(batch, GridPoint::DEPOT);
        assert_eq!(dests(&seq), vec![(50, 0), (2, 0), (1, 0)]);
    }

    #[test]
    fn nearest_next_within_tier() {
        // From (9,0): (10,0) is closest, then (11,0); (3,0) goes last even
        // though it came first in queue order.
        let batch = vec![
            order(10, 0, 1.0, Priority::High),
            order(3, 0, 1.0, Priority::High),
            order(11, 0, 1.0, Priority::High),
        ];
        let seq = PriorityAllocator.sequence(batch, GridPoint::new(9, 0));
        assert_eq!(dests(&seq), vec![(10, 0), (11, 0), (3, 0)]);
    }

    #[test]
    fn cursor_carries_across_tiers() {
        let batch = vec![
            order(20, 0, 1.0, Priority::High),
            order(1, 0, 1.0, Priority::Low),
            order(18, 0, 1.0, Priority::Low),
        ];
        let seq = PriorityAllocator.sequence(batch, GridPoint::DEPOT);
        assert_eq!(dests(&seq), vec![(20, 0), (18, 0), (1, 0)]);
    }

    #[test]
    fn empty_batch() {
        assert!(PriorityAllocator.sequence(Vec::new(), GridPoint::DEPOT).is_empty());
    }
}

// ── round_trip_distance ───────────────────────────────────────────────────────

#[cfg(test)]
mod projection {
    use super::*;

    #[test]
    fn sums_legs_and_return() {
        let orders = vec![order(3, 4, 1.0, Priority::High), order(6, 8, 1.0, Priority::High)];
        let d = round_trip_distance(GridPoint::DEPOT, &orders);
        assert!((d - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_is_just_going_home() {
        assert!((round_trip_distance(GridPoint::new(3, 4), &[]) - 5.0).abs() < 1e-9);
    }
}
