//! Vehicle mission state machine.
//!
//! ```text
//! Idle ─► Charging ─► Idle
//! Idle ─► Loading ─► InFlight ─► Delivering ─┐
//!                       ▲                    │ (next order)
//!                       └────────────────────┘
//!         Loading | InFlight | Delivering ─► Returning ─► Idle | Charging
//! ```
//!
//! No state is terminal.  Every edge the orchestrator or scheduler takes goes
//! through [`VehicleState::transition`], so an illegal edge is an explicit
//! error instead of a silently corrupted vehicle.

use crate::{CoreError, CoreResult};

/// Where a vehicle is in its mission cycle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum VehicleState {
    /// At the depot, available for allocation.
    #[default]
    Idle,
    /// Taking a batch on board.
    Loading,
    /// Flying towards the next destination.
    InFlight,
    /// Handing over an order at its destination.
    Delivering,
    /// Flying back to the depot.
    Returning,
    /// Docked at the depot, recharging.
    Charging,
}

impl VehicleState {
    /// `true` if `self -> to` is an edge of the state machine.
    pub fn can_transition(self, to: VehicleState) -> bool {
        use VehicleState::*;

        matches!(
            (self, to),
            (Idle, Charging)
                | (Charging, Idle)
                | (Idle, Loading)
                | (Loading, InFlight)
                | (InFlight, Delivering)
                | (Delivering, InFlight)
                | (Loading | InFlight | Delivering, Returning)
                | (Returning, Idle)
                | (Returning, Charging)
        )
    }

    /// Validate and take the edge `self -> to`.
    pub fn transition(self, to: VehicleState) -> CoreResult<VehicleState> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(CoreError::IllegalTransition { from: self, to })
        }
    }

    /// `true` while a batch is being flown (forced returns apply here).
    #[inline]
    pub fn is_on_mission(self) -> bool {
        matches!(
            self,
            VehicleState::Loading
                | VehicleState::InFlight
                | VehicleState::Delivering
                | VehicleState::Returning
        )
    }

    /// `true` while airborne (drains battery on the degradation tick).
    #[inline]
    pub fn is_airborne(self) -> bool {
        matches!(
            self,
            VehicleState::InFlight | VehicleState::Delivering | VehicleState::Returning
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleState::Idle       => "IDLE",
            VehicleState::Loading    => "LOADING",
            VehicleState::InFlight   => "IN_FLIGHT",
            VehicleState::Delivering => "DELIVERING",
            VehicleState::Returning  => "RETURNING",
            VehicleState::Charging   => "CHARGING",
        }
    }
}

impl std::fmt::Display for VehicleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
