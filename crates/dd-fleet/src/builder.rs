//! Fluent builder for a pre-populated [`Fleet`].
//!
//! # Usage
//!
//! ```rust
//! use dd_core::GridPoint;
//! use dd_fleet::FleetBuilder;
//!
//! let fleet = FleetBuilder::new()
//!     .vehicle("DRONE-01", 10.0, 100.0)
//!     .vehicle("DRONE-02", 15.0, 100.0)
//!     .zone(GridPoint::new(5, 5), GridPoint::new(15, 15), "Airport", "air traffic")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(fleet.vehicles().len(), 2);
//! assert_eq!(fleet.zones().len(), 1);
//! ```

use dd_core::{GridPoint, VehicleId};

use crate::{Fleet, FleetResult};

struct ZoneSeed {
    a:      GridPoint,
    b:      GridPoint,
    name:   String,
    reason: String,
}

/// Collects vehicles and zones, then validates them all in [`build`](Self::build).
#[derive(Default)]
pub struct FleetBuilder {
    vehicles: Vec<(VehicleId, f64, f64)>,
    zones:    Vec<ZoneSeed>,
}

impl FleetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vehicle with `capacity` and `max_range`.
    pub fn vehicle(mut self, id: impl Into<VehicleId>, capacity: f64, max_range: f64) -> Self {
        self.vehicles.push((id.into(), capacity, max_range));
        self
    }

    /// Add an exclusion zone spanning corners `a` and `b`.
    pub fn zone(
        mut self,
        a:      GridPoint,
        b:      GridPoint,
        name:   impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.zones.push(ZoneSeed { a, b, name: name.into(), reason: reason.into() });
        self
    }

    /// Build the fleet.  Fails on the first duplicate or invalid vehicle.
    pub fn build(self) -> FleetResult<Fleet> {
        let mut fleet = Fleet::new();
        for z in self.zones {
            fleet.add_zone(z.a, z.b, z.name, z.reason);
        }
        for (id, capacity, range) in self.vehicles {
            fleet.register_vehicle(id, capacity, range)?;
        }
        Ok(fleet)
    }
}
