//! Orders and the priority-sorted pending queue.

use std::cmp::Ordering;

use dd_core::{GridPoint, OrderId, Priority, Timestamp};

// ── Order ─────────────────────────────────────────────────────────────────────

/// A delivery request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id:          OrderId,
    pub customer:    String,
    pub destination: GridPoint,
    pub weight:      f64,
    pub priority:    Priority,
    pub created_at:  Timestamp,
}

impl Order {
    pub fn new(request: OrderRequest, created_at: Timestamp) -> Self {
        Self {
            id:          OrderId::generate(),
            customer:    request.customer,
            destination: request.destination,
            weight:      request.weight,
            priority:    request.priority,
            created_at,
        }
    }

    /// Overwrite the editable fields, keeping id and creation time.
    pub fn apply(&mut self, request: OrderRequest) {
        self.customer = request.customer;
        self.destination = request.destination;
        self.weight = request.weight;
        self.priority = request.priority;
    }

    #[inline]
    pub fn distance_to_depot(&self) -> f64 {
        self.destination.distance_to_depot()
    }

    /// Queue order: priority tier, then distance from the depot.
    pub fn queue_cmp(&self, other: &Order) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.distance_to_depot().total_cmp(&other.distance_to_depot()))
    }
}

/// The caller-editable part of an order, used for submission and edits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderRequest {
    pub customer:    String,
    pub destination: GridPoint,
    pub weight:      f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority:    Priority,
}

impl OrderRequest {
    pub fn new(
        customer:    impl Into<String>,
        destination: impl Into<GridPoint>,
        weight:      f64,
        priority:    Priority,
    ) -> Self {
        Self {
            customer: customer.into(),
            destination: destination.into(),
            weight,
            priority,
        }
    }
}

// ── OrderQueue ────────────────────────────────────────────────────────────────

/// Pending orders, kept sorted by [`Order::queue_cmp`] after every mutation.
///
/// The sort is stable, so orders with equal keys keep submission order.
#[derive(Debug, Clone, Default)]
pub struct OrderQueue {
    orders: Vec<Order>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn as_slice(&self) -> &[Order] {
        &self.orders
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// 1-based position of `id` in the queue.
    pub fn position(&self, id: OrderId) -> Option<usize> {
        self.orders.iter().position(|o| o.id == id).map(|i| i + 1)
    }

    pub fn push(&mut self, order: Order) {
        self.orders.push(order);
        self.resort();
    }

    /// Edit the order `id` in place and re-sort.  Returns `false` if absent.
    pub fn update(&mut self, id: OrderId, request: OrderRequest) -> bool {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        order.apply(request);
        self.resort();
        true
    }

    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| o.id == id)?;
        Some(self.orders.remove(pos))
    }

    /// Remove every order whose id is in `ids`, returning them in queue order.
    pub fn take(&mut self, ids: &[OrderId]) -> Vec<Order> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.orders).into_iter().partition(|o| ids.contains(&o.id));
        self.orders = kept;
        taken
    }

    fn resort(&mut self) {
        self.orders.sort_by(Order::queue_cmp);
    }

    /// `true` if the queue ordering invariant holds.
    pub fn is_sorted(&self) -> bool {
        self.orders.windows(2).all(|w| w[0].queue_cmp(&w[1]) != Ordering::Greater)
    }
}
