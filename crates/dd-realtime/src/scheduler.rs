//! Three independent periodic ticks over a [`FleetService`].
//!
//! | Tick        | First fire      | Period                 | Body                      |
//! |-------------|-----------------|------------------------|---------------------------|
//! | dispatch    | after 1 period  | `dispatch_interval`    | [`ticks::dispatch_tick`]  |
//! | degradation | after 1 period  | `degradation_interval` | [`ticks::degrade`]        |
//! | events      | `event_delay`   | `event_interval`       | [`ticks::random_event`]   |
//!
//! Each tick is its own tokio task holding the service lock only for the
//! duration of one body.  A failing or panicking body is logged and the
//! task keeps ticking.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use dd_dispatch::{DispatchResult, Dispatcher};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::{ticks, FleetService, RealtimeError, RealtimeResult, SchedulerConfig};

pub struct RealTimeScheduler {
    service:     FleetService,
    config:      SchedulerConfig,
    dispatch:    Option<JoinHandle<()>>,
    degradation: Option<JoinHandle<()>>,
    events:      Option<JoinHandle<()>>,
}

impl RealTimeScheduler {
    pub fn new(service: FleetService, config: SchedulerConfig) -> RealtimeResult<Self> {
        config.validate()?;
        Ok(Self { service, config, dispatch: None, degradation: None, events: None })
    }

    pub fn service(&self) -> &FleetService {
        &self.service
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// `true` between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.dispatch.is_some()
    }

    pub fn events_running(&self) -> bool {
        self.events.is_some()
    }

    /// Start the dispatch and degradation ticks.  Returns `false` (and does
    /// nothing) if they are already running.  Must be called from within a
    /// tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let period = self.config.dispatch_interval();
        self.dispatch = Some(spawn_tick("dispatch", self.service.clone(), period, period, |d| {
            if let Some(summary) = ticks::dispatch_tick(d)? {
                debug!(
                    missions  = summary.missions,
                    delivered = summary.delivered,
                    deferred  = summary.deferred,
                    "dispatch tick"
                );
            }
            Ok(())
        }));

        let period = self.config.degradation_interval();
        let config = self.config.clone();
        self.degradation = Some(spawn_tick("degradation", self.service.clone(), period, period, move |d| {
            let summary = ticks::degrade(d, &config)?;
            if summary.recovered > 0 {
                warn!(recovered = summary.recovered, "vehicles reset below battery floor");
            }
            debug!(drained = summary.drained, "degradation tick");
            Ok(())
        }));

        info!(
            dispatch_ms    = self.config.dispatch_interval_ms,
            degradation_ms = self.config.degradation_interval_ms,
            "scheduler started"
        );
        true
    }

    /// Start (or restart) the random-event tick.
    ///
    /// Returns `false` without starting anything if the scheduler is stopped
    /// or the fleet has no vehicles yet.
    pub async fn start_events(&mut self) -> bool {
        if !self.is_running() || !self.service.has_vehicles().await {
            debug!("random events not started");
            return false;
        }
        if let Some(previous) = self.events.take() {
            previous.abort();
        }

        let config = self.config.clone();
        self.events = Some(spawn_tick(
            "events",
            self.service.clone(),
            self.config.event_delay(),
            self.config.event_interval(),
            move |d| {
                if d.fleet().vehicles().is_empty() {
                    return Ok(());
                }
                let outcome = ticks::random_event(d, &config)?;
                debug!(?outcome, "random event tick");
                Ok(())
            },
        ));
        info!(
            delay_ms    = self.config.event_delay_ms,
            interval_ms = self.config.event_interval_ms,
            "random events started"
        );
        true
    }

    /// Cancel every tick.  Safe to call repeatedly; [`start`](Self::start)
    /// works again afterwards.
    pub fn stop(&mut self) {
        let mut stopped = false;
        for handle in [self.dispatch.take(), self.degradation.take(), self.events.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
            stopped = true;
        }
        if stopped {
            info!("scheduler stopped");
        }
    }
}

impl Drop for RealTimeScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run one tick body, turning a panic into [`RealtimeError::TickPanicked`].
pub fn run_isolated<T>(
    tick: &'static str,
    dispatcher: &mut Dispatcher,
    body: impl FnOnce(&mut Dispatcher) -> DispatchResult<T>,
) -> RealtimeResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(|| body(dispatcher))) {
        Ok(result) => Ok(result?),
        Err(payload) => Err(RealtimeError::TickPanicked { tick, message: panic_message(&*payload) }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn spawn_tick<F>(
    name: &'static str,
    service: FleetService,
    first: Duration,
    period: Duration,
    mut body: F,
) -> JoinHandle<()>
where
    F: FnMut(&mut Dispatcher) -> DispatchResult<()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + first, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let mut guard = service.lock().await;
            if let Err(e) = run_isolated(name, &mut *guard, &mut body) {
                error!(tick = name, error = %e, "tick failed");
            }
        }
    })
}
