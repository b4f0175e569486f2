//! `dd-core` — foundational types for the drone dispatch workspace.
//!
//! This crate is a dependency of every other `dd-*` crate.  It intentionally
//! has no `dd-*` dependencies and a small external footprint (`rand`,
//! `thiserror`, `uuid`, `chrono`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `OrderId`, `ZoneId`                      |
//! | [`geo`]         | `GridPoint`, Euclidean distance, the depot            |
//! | [`priority`]    | `Priority` tier (HIGH sorts first)                    |
//! | [`state`]       | `VehicleState` and its transition function           |
//! | [`time`]        | `Clock` trait, `WallClock`, `ManualClock`             |
//! | [`rng`]         | `RandomSource` trait, `SimRng`, `ScriptedRandom`      |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod priority;
pub mod rng;
pub mod state;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GridPoint;
pub use ids::{OrderId, VehicleId, ZoneId};
pub use priority::Priority;
pub use rng::{RandomSource, ScriptedRandom, SimRng};
pub use state::VehicleState;
pub use time::{Clock, ManualClock, Timestamp, WallClock};
