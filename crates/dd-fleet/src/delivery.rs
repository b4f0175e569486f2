//! Completed deliveries.

use dd_core::{OrderId, Timestamp, VehicleId};

use crate::Order;

/// One fulfilled order.  Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delivery {
    pub vehicle:      VehicleId,
    pub order:        Order,
    /// Grid units flown for this leg, detour included.
    pub distance:     f64,
    /// Simulated flight time for this leg, in minutes.
    pub minutes:      f64,
    /// Battery percent consumed by this leg.
    pub battery_used: f64,
    pub started_at:   Timestamp,
    pub completed_at: Timestamp,
}

/// Append-only delivery history.
///
/// There is no way to remove or mutate a recorded [`Delivery`].
#[derive(Debug, Clone, Default)]
pub struct DeliveryLog {
    entries: Vec<Delivery>,
}

impl DeliveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, delivery: Delivery) {
        self.entries.push(delivery);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Delivery] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Delivery> {
        self.entries.iter()
    }

    pub fn find(&self, order: OrderId) -> Option<&Delivery> {
        self.entries.iter().find(|d| d.order.id == order)
    }

    pub fn by_vehicle<'a>(&'a self, vehicle: &'a VehicleId) -> impl Iterator<Item = &'a Delivery> {
        self.entries.iter().filter(move |d| &d.vehicle == vehicle)
    }
}
