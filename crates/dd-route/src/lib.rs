//! `dd-route` — no-fly zones and zone-avoiding routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`zone`]    | `ExclusionZone` (inclusive rectangle, segment clipping)     |
//! | [`index`]   | `ZoneSet`: owned zones + R-tree for point/segment queries  |
//! | [`planner`] | `RoutePlanner` trait, `Route`, `DetourPlanner`              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod index;
pub mod planner;
pub mod zone;


pub use index::ZoneSet;
pub use planner::{total_distance, DetourPlanner, Route, RoutePlanner};
pub use zone::ExclusionZone;
