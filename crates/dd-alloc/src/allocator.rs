//! Greedy first-fit allocation and nearest-next sequencing.

use dd_core::{GridPoint, VehicleId};
use dd_fleet::{Order, Vehicle};

// ── Batch ─────────────────────────────────────────────────────────────────────

/// The orders assigned to one vehicle for one mission.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub vehicle: VehicleId,
    pub orders:  Vec<Order>,
}

impl Batch {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.orders.iter().map(|o| o.weight).sum()
    }
}

/// Length of `start → o₁ → … → oₙ → depot` along straight legs.
pub fn round_trip_distance(start: GridPoint, orders: &[Order]) -> f64 {
    let mut cursor = start;
    let mut total = 0.0;
    for order in orders {
        total += cursor.distance(order.destination);
        cursor = order.destination;
    }
    total + cursor.distance_to_depot()
}

// ── Allocator trait ───────────────────────────────────────────────────────────

/// Pluggable allocation strategy.
pub trait Allocator: Send + Sync {
    /// One batch per vehicle in `vehicles`, same order, possibly empty.
    ///
    /// `pending` is the queue in its sorted order.  An order appears in at
    /// most one batch; orders that fit nowhere appear in none.
    fn allocate(&self, vehicles: &[&Vehicle], pending: &[Order]) -> Vec<Batch>;

    /// Flying order for a batch starting at `start`.
    fn sequence(&self, batch: Vec<Order>, start: GridPoint) -> Vec<Order>;
}

// ── PriorityAllocator ─────────────────────────────────────────────────────────

/// Greedy first-fit over the priority-sorted queue.
///
/// Vehicles are visited in the given order.  Each one takes every remaining
/// order, front to back, whose weight still fits its remaining capacity;
/// orders that do not fit are skipped and stay available to later
/// vehicles.  An order heavier than every vehicle is never allocated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityAllocator;

impl Allocator for PriorityAllocator {
    fn allocate(&self, vehicles: &[&Vehicle], pending: &[Order]) -> Vec<Batch> {
        let mut remaining: Vec<&Order> = pending.iter().collect();
        let mut batches = Vec::with_capacity(vehicles.len());

        for vehicle in vehicles {
            let mut room = vehicle.capacity;
            let mut orders = Vec::new();
            remaining.retain(|order| {
                if order.weight <= room {
                    room -= order.weight;
                    orders.push((*order).clone());
                    false
                } else {
                    true
                }
            });
            batches.push(Batch { vehicle: vehicle.id.clone(), orders });
        }
        batches
    }

    /// Priority tier first; inside a tier, repeatedly fly to the closest
    /// remaining destination from the current cursor.
    fn sequence(&self, mut batch: Vec<Order>, start: GridPoint) -> Vec<Order> {
        // Stable sort keeps queue order as the tie-break inside a tier.
        batch.sort_by_key(|o| o.priority);

        let mut out = Vec::with_capacity(batch.len());
        let mut cursor = start;
        let mut rest = batch.as_slice();

        while let Some(first) = rest.first() {
            let tier_len = rest.iter().take_while(|o| o.priority == first.priority).count();
            let mut tier: Vec<&Order> = rest[..tier_len].iter().collect();

            while !tier.is_empty() {
                let best = tier
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        cursor.distance(a.destination).total_cmp(&cursor.distance(b.destination))
                    })
                    .map_or(0, |(i, _)| i);
                let next = tier.remove(best);
                cursor = next.destination;
                out.push(next.clone());
            }
            rest = &rest[tier_len..];
        }
        out
    }
}
