//! `dd-alloc` — the priority allocator.
//!
//! Two steps, both pure:
//!
//! 1. [`Allocator::allocate`] partitions the sorted pending queue across
//!    idle vehicles by capacity.
//! 2. [`Allocator::sequence`] orders one vehicle's batch for flying.
//!
//! The dispatcher talks to the [`Allocator`] trait; [`PriorityAllocator`] is
//! the greedy first-fit implementation.

pub mod allocator;

#[cfg(test)]
mod tests;

pub use allocator::{round_trip_distance, Allocator, Batch, PriorityAllocator};
