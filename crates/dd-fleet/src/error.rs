use dd_core::{CoreError, GridPoint, OrderId, VehicleId, VehicleState, ZoneId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FleetError {
    #[error("destination {point} is inside exclusion zone '{zone}' ({reason})")]
    ValidationRejected {
        point:  GridPoint,
        zone:   String,
        reason: String,
    },

    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("exclusion zone {0} not found")]
    ZoneNotFound(ZoneId),

    #[error("cannot {action} vehicle {vehicle} while {state}")]
    IllegalState {
        vehicle: VehicleId,
        state:   VehicleState,
        action:  &'static str,
    },

    #[error("vehicle {0} is already registered")]
    DuplicateVehicle(VehicleId),

    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type FleetResult<T> = Result<T, FleetError>;
