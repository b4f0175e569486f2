//! Fluent builder for a [`Dispatcher`].

use dd_alloc::{Allocator, PriorityAllocator};
use dd_core::{Clock, RandomSource, SimRng, WallClock};
use dd_fleet::Fleet;
use dd_route::{DetourPlanner, RoutePlanner};

use crate::{DispatchConfig, DispatchObserver, DispatchResult, Dispatcher, NoopObserver};

/// Seed used when neither [`rng`](DispatcherBuilder::rng) nor
/// [`seed`](DispatcherBuilder::seed) is called.
pub const DEFAULT_SEED: u64 = 42;

/// Fluent builder for [`Dispatcher`].
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                          |
/// |-------------------|----------------------------------|
/// | `.config(c)`      | `DispatchConfig::default()`      |
/// | `.planner(p)`     | `DetourPlanner::default()`       |
/// | `.allocator(a)`   | `PriorityAllocator`              |
/// | `.rng(r)`/`.seed` | `SimRng::new(DEFAULT_SEED)`      |
/// | `.clock(c)`       | `WallClock`                      |
/// | `.observer(o)`    | `NoopObserver`                   |
///
/// # Example
///
/// ```rust
/// use dd_dispatch::{DispatcherBuilder, TracingObserver};
/// use dd_fleet::FleetBuilder;
///
/// let fleet = FleetBuilder::new().vehicle("DRONE-01", 10.0, 100.0).build().unwrap();
/// let mut dispatcher = DispatcherBuilder::new(fleet)
///     .seed(7)
///     .observer(TracingObserver)
///     .build()
///     .unwrap();
/// dispatcher.run_cycle().unwrap();
/// ```
pub struct DispatcherBuilder {
    fleet:     Fleet,
    config:    DispatchConfig,
    planner:   Option<Box<dyn RoutePlanner>>,
    allocator: Option<Box<dyn Allocator>>,
    rng:       Option<Box<dyn RandomSource>>,
    clock:     Option<Box<dyn Clock>>,
    observer:  Option<Box<dyn DispatchObserver>>,
}

impl DispatcherBuilder {
    pub fn new(fleet: Fleet) -> Self {
        Self {
            fleet,
            config:    DispatchConfig::default(),
            planner:   None,
            allocator: None,
            rng:       None,
            clock:     None,
            observer:  None,
        }
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn planner(mut self, planner: impl RoutePlanner + 'static) -> Self {
        self.planner = Some(Box::new(planner));
        self
    }

    pub fn allocator(mut self, allocator: impl Allocator + 'static) -> Self {
        self.allocator = Some(Box::new(allocator));
        self
    }

    pub fn rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Shorthand for `.rng(SimRng::new(seed))`.
    pub fn seed(self, seed: u64) -> Self {
        self.rng(SimRng::new(seed))
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn observer(mut self, observer: impl DispatchObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Validate the config and assemble the dispatcher.
    pub fn build(self) -> DispatchResult<Dispatcher> {
        self.config.validate()?;
        Ok(Dispatcher {
            fleet:     self.fleet,
            config:    self.config,
            planner:   self.planner.unwrap_or_else(|| Box::new(DetourPlanner::default())),
            allocator: self.allocator.unwrap_or_else(|| Box::new(PriorityAllocator)),
            rng:       self.rng.unwrap_or_else(|| Box::new(SimRng::new(DEFAULT_SEED))),
            clock:     self.clock.unwrap_or_else(|| Box::new(WallClock)),
            observer:  self.observer.unwrap_or_else(|| Box::new(NoopObserver)),
        })
    }
}
