use dd_core::CoreError;
use dd_dispatch::DispatchError;
use dd_fleet::FleetError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RealtimeError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A tick body panicked; the scheduler logged it and kept running.
    #[error("{tick} tick panicked: {message}")]
    TickPanicked { tick: &'static str, message: String },
}

impl From<FleetError> for RealtimeError {
    fn from(err: FleetError) -> Self {
        RealtimeError::Dispatch(err.into())
    }
}

pub type RealtimeResult<T> = Result<T, RealtimeError>;
