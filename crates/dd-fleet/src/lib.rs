//! `dd-fleet` — the fleet and order store.
//!
//! [`Fleet`] is the single aggregate holding every piece of mutable dispatch
//! state: registered vehicles, the pending-order queue, the exclusion zones
//! and the append-only delivery history.  It is deliberately not `Sync`
//! aware; callers that share it across tasks put it behind one mutex
//! (see `dd-realtime`).
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`vehicle`]  | `Vehicle` (battery, position, state, allocated orders)    |
//! | [`order`]    | `Order`, `OrderRequest`, `OrderQueue` (always sorted)     |
//! | [`delivery`] | `Delivery` record, append-only `DeliveryLog`              |
//! | [`fleet`]    | `Fleet` aggregate, `OrderStatus`                          |
//! | [`builder`]  | `FleetBuilder`                                            |
//! | [`error`]    | `FleetError`, `FleetResult`                               |

pub mod builder;
pub mod delivery;
pub mod error;
pub mod fleet;
pub mod order;
pub mod vehicle;


pub use builder::FleetBuilder;
pub use delivery::{Delivery, DeliveryLog};
pub use error::{FleetError, FleetResult};
pub use fleet::{Fleet, FleetPartsMut, OrderStatus};
pub use order::{Order, OrderQueue, OrderRequest};
pub use vehicle::Vehicle;
