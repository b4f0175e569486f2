//! `dd-dispatch` — the dispatch orchestrator.
//!
//! [`Dispatcher`] owns the [`Fleet`](dd_fleet::Fleet) and drives every
//! vehicle through its mission cycle: battery governance, allocation,
//! round-trip admission, per-leg routing and battery accounting, and the
//! return home.  All randomness and time come from injected
//! [`RandomSource`](dd_core::RandomSource) and [`Clock`](dd_core::Clock)
//! implementations; all logging goes through a [`DispatchObserver`].
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`dispatcher`] | `Dispatcher`, `CycleSummary`, operator actions           |
//! | [`builder`]    | `DispatcherBuilder`                                      |
//! | [`config`]     | `DispatchConfig`                                         |
//! | [`event`]      | `FleetEvent`, `DispatchObserver` + stock observers       |
//! | [`report`]     | route report, battery snapshot, statistics, fleet report |
//! | [`error`]      | `DispatchError`, `DispatchResult`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `DispatchConfig` (de)serialization, `Serialize` on reports. |

pub mod builder;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod report;

#[cfg(test)]
mod tests;

pub use builder::{DispatcherBuilder, DEFAULT_SEED};
pub use config::DispatchConfig;
pub use dispatcher::{CycleSummary, Dispatcher};
pub use error::{DispatchError, DispatchResult};
pub use event::{
    DispatchObserver, FleetEvent, NoopObserver, RecordingObserver, ReturnTrigger, TracingObserver,
};
pub use report::{
    BatterySnapshot, BatteryStatus, FleetReport, FleetStatistics, RouteReport, VehicleLine,
};
