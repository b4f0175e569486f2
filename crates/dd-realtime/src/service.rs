//! The single serialization point for the fleet.
//!
//! Every mutation, whether from a caller or from a scheduler tick, goes
//! through one `tokio::sync::Mutex<Dispatcher>`, so no two cycles ever
//! interleave their reads and writes on the same vehicle or queue.

use std::sync::Arc;

use dd_core::{GridPoint, OrderId, VehicleId};
use dd_dispatch::{
    BatterySnapshot, CycleSummary, Dispatcher, FleetReport, FleetStatistics, RouteReport,
};
use dd_fleet::{OrderRequest, OrderStatus};
use tokio::sync::{Mutex, MutexGuard};

use crate::RealtimeResult;

/// Cheap-to-clone handle to a shared [`Dispatcher`].
#[derive(Clone)]
pub struct FleetService {
    inner: Arc<Mutex<Dispatcher>>,
}

impl FleetService {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { inner: Arc::new(Mutex::new(dispatcher)) }
    }

    /// Exclusive access for anything not covered by the helpers below.
    pub async fn lock(&self) -> MutexGuard<'_, Dispatcher> {
        self.inner.lock().await
    }

    /// Run `f` with exclusive access to the dispatcher.
    pub async fn with<R>(&self, f: impl FnOnce(&mut Dispatcher) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut *guard)
    }

    pub async fn register_vehicle(
        &self,
        id: impl Into<VehicleId>,
        capacity: f64,
        max_range: f64,
    ) -> RealtimeResult<()> {
        let id = id.into();
        self.with(|d| d.fleet_mut().register_vehicle(id, capacity, max_range).map(|_| ()))
            .await
            .map_err(Into::into)
    }

    pub async fn has_vehicles(&self) -> bool {
        self.with(|d| !d.fleet().vehicles().is_empty()).await
    }

    pub async fn submit_order(&self, request: OrderRequest) -> RealtimeResult<OrderId> {
        Ok(self.with(|d| d.submit_order(request)).await?)
    }

    pub async fn order_status(&self, id: OrderId) -> OrderStatus {
        self.with(|d| d.order_status(id)).await
    }

    pub async fn queued_orders(&self) -> usize {
        self.with(|d| d.fleet().queue().len()).await
    }

    /// One dispatch cycle on demand.
    pub async fn run_cycle(&self) -> RealtimeResult<CycleSummary> {
        Ok(self.with(|d| d.run_cycle()).await?)
    }

    pub async fn force_return(&self, id: &VehicleId) -> RealtimeResult<()> {
        Ok(self.with(|d| d.force_return(id)).await?)
    }

    pub async fn recharge_vehicle(&self, id: &VehicleId) -> RealtimeResult<()> {
        Ok(self.with(|d| d.recharge_vehicle(id)).await?)
    }

    pub async fn recharge_all(&self) -> RealtimeResult<usize> {
        Ok(self.with(|d| d.recharge_all()).await?)
    }

    pub async fn route_report(&self, start: GridPoint, end: GridPoint) -> RouteReport {
        self.with(|d| d.route_report(start, end)).await
    }

    pub async fn battery_snapshot(&self) -> BatterySnapshot {
        self.with(|d| d.battery_snapshot()).await
    }

    pub async fn statistics(&self) -> FleetStatistics {
        self.with(|d| d.statistics()).await
    }

    pub async fn report(&self) -> FleetReport {
        self.with(|d| d.report()).await
    }
}
