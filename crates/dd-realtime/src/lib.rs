//! `dd-realtime` — the fleet behind a lock, driven by timers.
//!
//! [`FleetService`] wraps a [`Dispatcher`](dd_dispatch::Dispatcher) in a
//! single `tokio::sync::Mutex`; callers and ticks share clones of it.
//! [`RealTimeScheduler`] runs the dispatch, degradation and random-event
//! ticks as tokio tasks that can be stopped and started again.
//!
//! # Crate layout
//!
//! | Module        | Contents                                             |
//! |---------------|------------------------------------------------------|
//! | [`service`]   | `FleetService`                                       |
//! | [`scheduler`] | `RealTimeScheduler`, panic isolation                 |
//! | [`ticks`]     | tick bodies: `dispatch_tick`, `degrade`, `random_event` |
//! | [`config`]    | `SchedulerConfig`                                    |
//! | [`error`]     | `RealtimeError`, `RealtimeResult`                    |

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;
pub mod ticks;


pub use config::SchedulerConfig;
pub use error::{RealtimeError, RealtimeResult};
pub use scheduler::{run_isolated, RealTimeScheduler};
pub use service::FleetService;
pub use ticks::{DegradationSummary, RandomEvent};
