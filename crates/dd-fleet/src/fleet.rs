//! The `Fleet` aggregate: vehicles, queue, zones and history.

use dd_core::{GridPoint, OrderId, Timestamp, VehicleId, ZoneId};
use dd_route::{ExclusionZone, ZoneSet};

use crate::{DeliveryLog, FleetError, FleetResult, Order, OrderQueue, OrderRequest, Vehicle};

// ── OrderStatus ───────────────────────────────────────────────────────────────

/// Where an order currently is.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderStatus {
    /// Waiting in the queue at 1-based `position`.
    Queued { position: usize },
    /// On board `vehicle`, which is `distance_from_depot` units out.
    InFlight { vehicle: VehicleId, distance_from_depot: f64 },
    /// Delivered by `vehicle` at `at`.
    Delivered { vehicle: VehicleId, at: Timestamp },
    NotFound,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Queued { position } => write!(f, "queued at position {position}"),
            OrderStatus::InFlight { vehicle, distance_from_depot } => {
                write!(f, "in flight on {vehicle}, {distance_from_depot:.0} units from depot")
            }
            OrderStatus::Delivered { vehicle, at } => {
                write!(f, "delivered by {vehicle} at {}", at.to_rfc3339())
            }
            OrderStatus::NotFound => f.write_str("not found"),
        }
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

/// All mutable dispatch state.
///
/// Every operation that can be refused returns a [`FleetError`]; nothing is
/// dropped silently.
#[derive(Debug, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
    queue:    OrderQueue,
    zones:    ZoneSet,
    history:  DeliveryLog,
}

/// Disjoint mutable borrows of a [`Fleet`], for the dispatch loop.
pub struct FleetPartsMut<'a> {
    pub vehicles: &'a mut [Vehicle],
    pub zones:    &'a ZoneSet,
    pub history:  &'a mut DeliveryLog,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parts_mut(&mut self) -> FleetPartsMut<'_> {
        FleetPartsMut {
            vehicles: &mut self.vehicles,
            zones:    &self.zones,
            history:  &mut self.history,
        }
    }

    // ── Vehicles ──────────────────────────────────────────────────────────

    /// Register a new vehicle; full battery, idle at the depot.
    pub fn register_vehicle(
        &mut self,
        id:        impl Into<VehicleId>,
        capacity:  f64,
        max_range: f64,
    ) -> FleetResult<&Vehicle> {
        let id = id.into();
        check_positive("capacity", capacity)?;
        check_positive("max_range", max_range)?;
        if self.vehicle(&id).is_some() {
            return Err(FleetError::DuplicateVehicle(id));
        }
        self.vehicles.push(Vehicle::new(id, capacity, max_range));
        let last = self.vehicles.len() - 1;
        Ok(&self.vehicles[last])
    }

    /// Vehicles in registration order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicles_mut(&mut self) -> &mut [Vehicle] {
        &mut self.vehicles
    }

    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }

    pub fn vehicle_mut(&mut self, id: &VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| &v.id == id)
    }

    pub fn find_vehicle(&self, id: &VehicleId) -> FleetResult<&Vehicle> {
        self.vehicle(id).ok_or_else(|| FleetError::VehicleNotFound(id.clone()))
    }

    pub fn find_vehicle_mut(&mut self, id: &VehicleId) -> FleetResult<&mut Vehicle> {
        self.vehicles
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()))
    }

    /// Change capacity and range of an idle vehicle.
    ///
    /// A battery above the new range is clamped down to it.
    pub fn edit_vehicle(&mut self, id: &VehicleId, capacity: f64, max_range: f64) -> FleetResult<()> {
        check_positive("capacity", capacity)?;
        check_positive("max_range", max_range)?;
        let vehicle = self.find_vehicle_mut(id)?;
        if !vehicle.is_idle() {
            return Err(FleetError::IllegalState {
                vehicle: vehicle.id.clone(),
                state:   vehicle.state,
                action:  "edit",
            });
        }
        vehicle.capacity = capacity;
        vehicle.max_range = max_range;
        if vehicle.battery > max_range {
            vehicle.set_battery(max_range);
        }
        Ok(())
    }

    /// Remove an idle vehicle.
    pub fn remove_vehicle(&mut self, id: &VehicleId) -> FleetResult<Vehicle> {
        let pos = self
            .vehicles
            .iter()
            .position(|v| &v.id == id)
            .ok_or_else(|| FleetError::VehicleNotFound(id.clone()))?;
        let vehicle = &self.vehicles[pos];
        if !vehicle.is_idle() {
            return Err(FleetError::IllegalState {
                vehicle: vehicle.id.clone(),
                state:   vehicle.state,
                action:  "remove",
            });
        }
        Ok(self.vehicles.remove(pos))
    }

    // ── Orders ────────────────────────────────────────────────────────────

    /// Queue a new order.  Rejected if the destination lies in a zone.
    pub fn submit_order(&mut self, request: OrderRequest, now: Timestamp) -> FleetResult<OrderId> {
        self.validate_request(&request)?;
        let order = Order::new(request, now);
        let id = order.id;
        self.queue.push(order);
        Ok(id)
    }

    /// Edit a queued order.  The new destination is re-validated.
    pub fn edit_order(&mut self, id: OrderId, request: OrderRequest) -> FleetResult<()> {
        if self.queue.get(id).is_none() {
            return Err(FleetError::OrderNotFound(id));
        }
        self.validate_request(&request)?;
        self.queue.update(id, request);
        Ok(())
    }

    pub fn remove_order(&mut self, id: OrderId) -> FleetResult<Order> {
        self.queue.remove(id).ok_or(FleetError::OrderNotFound(id))
    }

    /// A queued order.
    pub fn find_order(&self, id: OrderId) -> FleetResult<&Order> {
        self.queue.get(id).ok_or(FleetError::OrderNotFound(id))
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    /// Pull the orders `ids` out of the queue for a mission.
    pub fn take_orders(&mut self, ids: &[OrderId]) -> Vec<Order> {
        self.queue.take(ids)
    }

    fn validate_request(&self, request: &OrderRequest) -> FleetResult<()> {
        check_positive("weight", request.weight)?;
        if let Some(zone) = self.zones.containing(request.destination) {
            return Err(FleetError::ValidationRejected {
                point:  request.destination,
                zone:   zone.name.clone(),
                reason: zone.reason.clone(),
            });
        }
        Ok(())
    }

    /// Where order `id` is: queued, on board, delivered, or unknown.
    pub fn order_status(&self, id: OrderId) -> OrderStatus {
        if let Some(position) = self.queue.position(id) {
            return OrderStatus::Queued { position };
        }
        if let Some(v) = self.vehicles.iter().find(|v| v.orders.iter().any(|o| o.id == id)) {
            return OrderStatus::InFlight {
                vehicle:             v.id.clone(),
                distance_from_depot: v.distance_to_depot(),
            };
        }
        if let Some(d) = self.history.find(id) {
            return OrderStatus::Delivered { vehicle: d.vehicle.clone(), at: d.completed_at };
        }
        OrderStatus::NotFound
    }

    // ── Zones ─────────────────────────────────────────────────────────────

    /// Create a zone.  Already-queued orders are not re-validated.
    pub fn add_zone(
        &mut self,
        a:      GridPoint,
        b:      GridPoint,
        name:   impl Into<String>,
        reason: impl Into<String>,
    ) -> ZoneId {
        self.zones.insert(ExclusionZone::new(a, b, name, reason))
    }

    pub fn edit_zone(
        &mut self,
        id:     ZoneId,
        a:      GridPoint,
        b:      GridPoint,
        name:   &str,
        reason: &str,
    ) -> FleetResult<()> {
        if self.zones.update(id, a, b, name, reason) {
            Ok(())
        } else {
            Err(FleetError::ZoneNotFound(id))
        }
    }

    pub fn remove_zone(&mut self, id: ZoneId) -> FleetResult<ExclusionZone> {
        self.zones.remove(id).ok_or(FleetError::ZoneNotFound(id))
    }

    pub fn find_zone(&self, id: ZoneId) -> FleetResult<&ExclusionZone> {
        self.zones.get(id).ok_or(FleetError::ZoneNotFound(id))
    }

    /// The first zone containing `point`, if any.
    pub fn zone_at(&self, point: GridPoint) -> Option<&ExclusionZone> {
        self.zones.containing(point)
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    // ── History ───────────────────────────────────────────────────────────

    pub fn history(&self) -> &DeliveryLog {
        &self.history
    }
}

fn check_positive(field: &'static str, value: f64) -> FleetResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FleetError::InvalidInput { field, value })
    }
}
