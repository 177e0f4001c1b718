//! Shared handle serializing access to a parking system

use crate::registry::{Zone, ZoneId};
use crate::request::{ParkingRequest, RequestId};
use crate::{ParkingSystem, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// ParkingService lets many tasks share one [`ParkingSystem`].
///
/// Every mutating call holds the write lock for its whole duration, so
/// submissions, cancellations and releases are applied one after another.
/// Reads share the lock with each other but never observe a half-applied
/// mutation.
#[derive(Clone, Default)]
pub struct ParkingService {
    system: Arc<RwLock<ParkingSystem>>,
}

impl ParkingService {
    pub fn new(system: ParkingSystem) -> Self {
        Self {
            system: Arc::new(RwLock::new(system)),
        }
    }

    /// Register a zone
    pub async fn add_zone(&self, zone: Zone) {
        let mut system = self.system.write().await;
        system.add_zone(zone);
    }

    /// Submit a parking request
    pub async fn submit_request(&self, vehicle_id: &str, zone_id: ZoneId) -> Result<RequestId> {
        let mut system = self.system.write().await;
        system.submit_request(vehicle_id, zone_id)
    }

    /// Mark a request as occupying its slot
    pub async fn occupy_slot(&self, request_id: RequestId) -> Result<()> {
        let mut system = self.system.write().await;
        system.occupy_slot(request_id)
    }

    /// Cancel a request
    pub async fn cancel_request(&self, request_id: RequestId) -> Result<()> {
        let mut system = self.system.write().await;
        system.cancel_request(request_id)
    }

    /// Release a request's slot
    pub async fn release_slot(&self, request_id: RequestId) -> Result<()> {
        let mut system = self.system.write().await;
        system.release_slot(request_id)
    }

    /// Undo the `k` most recent outstanding allocations
    pub async fn rollback(&self, k: usize) -> usize {
        let mut system = self.system.write().await;
        let undone = system.rollback(k);
        debug!("Service rollback undid {} of {} requested", undone, k);
        undone
    }

    /// Run a read-only closure against a consistent view of the system
    pub async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ParkingSystem) -> R,
    {
        let system = self.system.read().await;
        f(&*system)
    }

    /// Get a copy of a request
    pub async fn request(&self, request_id: RequestId) -> Option<ParkingRequest> {
        self.read(|s| s.request(request_id).cloned()).await
    }

    /// List all requests
    pub async fn requests(&self) -> Vec<ParkingRequest> {
        self.read(|s| s.requests().to_vec()).await
    }

    /// List all zones with their current slot availability
    pub async fn zones(&self) -> Vec<Zone> {
        self.read(|s| s.zones().to_vec()).await
    }

    /// Number of allocations that can still be rolled back
    pub async fn history_len(&self) -> usize {
        self.read(ParkingSystem::history_len).await
    }
}
