//! simulate — end-to-end run of the drone dispatch stack.
//!
//! Registers a small fleet, draws a no-fly zone over the city centre, runs
//! one dispatch cycle by hand, then lets the real-time scheduler drive the
//! fleet for a few (compressed) seconds while more orders arrive.
//!
//! Usage: `simulate [config.json]`.  The optional file may set any of
//! `seed`, `run_secs`, `dispatch` (a `DispatchConfig`) and `scheduler` (a
//! `SchedulerConfig`); missing fields keep their defaults.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dd_core::{GridPoint, Priority};
use dd_dispatch::{DispatchConfig, DispatcherBuilder, TracingObserver};
use dd_fleet::{FleetBuilder, OrderRequest};
use dd_realtime::{FleetService, RealTimeScheduler, SchedulerConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:     u64 = 42;
const RUN_SECS: u64 = 12;

// ── Config file ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SimulationConfig {
    seed:      u64,
    run_secs:  u64,
    dispatch:  DispatchConfig,
    scheduler: SchedulerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed:      SEED,
            run_secs:  RUN_SECS,
            dispatch:  DispatchConfig::default(),
            // Seconds instead of minutes so the demo finishes quickly.
            scheduler: SchedulerConfig {
                dispatch_interval_ms:    1_000,
                degradation_interval_ms: 3_000,
                event_delay_ms:          2_000,
                event_interval_ms:       4_000,
                ..SchedulerConfig::default()
            },
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ── Orders ────────────────────────────────────────────────────────────────────

fn order(customer: &str, x: i32, y: i32, weight: f64, priority: Priority) -> OrderRequest {
    OrderRequest::new(customer, GridPoint::new(x, y), weight, priority)
}

fn first_wave() -> Vec<OrderRequest> {
    vec![
        order("Ana", 3, 4, 2.0, Priority::High),
        order("Bruno", 12, 30, 4.5, Priority::Medium),
        order("Carla", 40, 8, 1.0, Priority::Low),
        // Inside the airport zone; rejected.
        order("Davi", 25, 25, 1.0, Priority::High),
        order("Elisa", 6, 18, 3.0, Priority::High),
    ]
}

fn second_wave() -> Vec<OrderRequest> {
    vec![
        order("Fabio", 45, 45, 2.5, Priority::Medium),
        order("Gabi", 2, 35, 1.5, Priority::High),
        order("Hugo", 33, 3, 6.0, Priority::Low),
    ]
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args().nth(1);
    let config = load_config(path.as_deref().map(Path::new))?;
    println!("=== simulate — drone dispatch ===");
    println!("Seed: {}  |  Run: {} s", config.seed, config.run_secs);
    println!();

    // 1. Fleet and no-fly zone.
    let fleet = FleetBuilder::new()
        .vehicle("DRONE-01", 10.0, 100.0)
        .vehicle("DRONE-02", 8.0, 100.0)
        .vehicle("DRONE-03", 5.0, 80.0)
        .zone(GridPoint::new(20, 20), GridPoint::new(30, 30), "Airport", "controlled airspace")
        .build()?;

    // 2. Dispatcher with structured event logging.
    let mut dispatcher = DispatcherBuilder::new(fleet)
        .config(config.dispatch.clone())
        .seed(config.seed)
        .observer(TracingObserver)
        .build()?;

    // 3. Orders; rejections are logged by the observer and skipped here.
    for req in first_wave() {
        if let Err(e) = dispatcher.submit_order(req) {
            warn!(error = %e, "order not accepted");
        }
    }

    // 4. One cycle on demand.
    let summary = dispatcher.run_cycle()?;
    println!("Manual cycle: {summary:?}");

    let route = dispatcher.route_report(GridPoint::new(0, 0), GridPoint::new(50, 50));
    println!(
        "Route (0, 0) → (50, 50): {}  direct {:.1}  planned {:.1}  zones {:?}",
        route.route, route.direct_distance, route.route_distance, route.intersected_zones
    );
    println!();

    // 5. Hand the dispatcher to the service and start the timers.
    let service = FleetService::new(dispatcher);
    let mut scheduler = RealTimeScheduler::new(service.clone(), config.scheduler)?;
    scheduler.start();
    scheduler.start_events().await;

    for req in second_wave() {
        if let Err(e) = service.submit_order(req).await {
            warn!(error = %e, "order not accepted");
        }
    }

    tokio::time::sleep(Duration::from_secs(config.run_secs)).await;
    scheduler.stop();
    info!("simulation finished");

    // 6. Reports.
    println!();
    print!("{}", service.report().await);
    println!();
    println!("Statistics:");
    println!("{}", serde_json::to_string_pretty(&service.statistics().await)?);
    println!("Battery:");
    println!("{}", serde_json::to_string_pretty(&service.battery_snapshot().await)?);

    Ok(())
}
