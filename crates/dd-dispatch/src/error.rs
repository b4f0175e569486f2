use dd_core::CoreError;
use dd_fleet::FleetError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
