//! Core error type.
//!
//! Higher crates wrap `CoreError` as one variant of their own enums via a
//! `#[from]` conversion so `?` works across crate boundaries.

use thiserror::Error;

use crate::VehicleState;

/// Errors produced by `dd-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("illegal vehicle transition {from} -> {to}")]
    IllegalTransition { from: VehicleState, to: VehicleState },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `dd-core`.
pub type CoreResult<T> = Result<T, CoreError>;
