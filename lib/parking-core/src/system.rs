//! Allocation orchestrator tying registry, requests and rollback log together

use crate::allocation::AllocationEngine;
use crate::registry::{SlotRegistry, Zone, ZoneId};
use crate::request::{ParkingRequest, RequestId, RequestState};
use crate::rollback::{RollbackLog, RollbackRecord};
use crate::vehicle::Vehicle;
use crate::{CoreError, Result};
use chrono::Utc;
use tracing::{debug, info};

/// ParkingSystem owns the slot registry, the vehicles and requests seen so
/// far, and the rollback log.
///
/// All mutation goes through `&mut self`; callers sharing a system between
/// tasks go through [`crate::ParkingService`].
#[derive(Debug, Default)]
pub struct ParkingSystem {
    registry: SlotRegistry,
    vehicles: Vec<Vehicle>,
    requests: Vec<ParkingRequest>,
    engine: AllocationEngine,
    rollback_log: RollbackLog,
}

impl ParkingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a system from pre-built zones
    pub fn with_zones(zones: impl IntoIterator<Item = Zone>) -> Self {
        let mut system = Self::new();
        for zone in zones {
            system.add_zone(zone);
        }
        system
    }

    /// Register a zone before serving requests
    pub fn add_zone(&mut self, zone: Zone) {
        self.registry.add_zone(zone);
    }

    /// Allocate a slot for `vehicle_id`, preferring `zone_id`.
    ///
    /// On success the request is stored in the `Allocated` state and its id
    /// returned. When every zone is full nothing is stored except the
    /// vehicle record, which is kept for later requests.
    pub fn submit_request(&mut self, vehicle_id: &str, zone_id: ZoneId) -> Result<RequestId> {
        self.ensure_vehicle(vehicle_id, zone_id);

        let slot = self
            .engine
            .allocate(zone_id, self.registry.zones())
            .ok_or_else(|| {
                info!(
                    "No slot available for vehicle {} (zone {})",
                    vehicle_id, zone_id
                );
                CoreError::NoSlotAvailable { zone_id }
            })?;

        let request_id = self.requests.len();
        let mut request = ParkingRequest::new(request_id, vehicle_id, zone_id, Utc::now());
        let previous_state = request.state();
        request.change_state(RequestState::Allocated)?;

        let previous_availability = self
            .registry
            .set_available(slot, false)
            .ok_or_else(|| {
                CoreError::Internal(format!("allocated slot {:?} does not resolve", slot))
            })?;
        request.set_allocated_slot(Some(slot));
        self.requests.push(request);

        self.rollback_log.record(RollbackRecord {
            slot,
            previous_availability,
            request_id,
            previous_state,
        });

        info!(
            "Request {} for vehicle {} allocated slot {:?} (requested zone {})",
            request_id, vehicle_id, slot, zone_id
        );
        Ok(request_id)
    }

    /// Mark an allocated request's vehicle as parked
    pub fn occupy_slot(&mut self, request_id: RequestId) -> Result<()> {
        let request = self.request_mut(request_id)?;
        request.change_state(RequestState::Occupied)?;
        debug!("Request {} is now occupying its slot", request_id);
        Ok(())
    }

    /// Cancel a request and free the slot it holds
    pub fn cancel_request(&mut self, request_id: RequestId) -> Result<()> {
        let request = self.request_mut(request_id)?;
        let state = request.state();
        if state.is_terminal() {
            return Err(CoreError::AlreadyTerminal { request_id, state });
        }

        request.change_state(RequestState::Cancelled)?;
        request.set_allocated_slot(None);
        self.rollback_log.undo_request(request_id, &mut self.registry);

        info!("Request {} cancelled", request_id);
        Ok(())
    }

    /// Release the slot held by a request
    pub fn release_slot(&mut self, request_id: RequestId) -> Result<()> {
        let request = self.request_mut(request_id)?;
        let state = request.state();
        if !state.holds_slot() {
            return Err(CoreError::NotReleasable { request_id, state });
        }

        request.change_state(RequestState::Released)?;
        request.set_allocated_slot(None);
        self.rollback_log.undo_request(request_id, &mut self.registry);

        info!("Request {} released its slot", request_id);
        Ok(())
    }

    /// Undo the `k` most recent outstanding allocations.
    ///
    /// Returns how many were undone; never fails.
    pub fn rollback(&mut self, k: usize) -> usize {
        self.rollback_log
            .rollback(k, &mut self.registry, &mut self.requests)
    }

    fn ensure_vehicle(&mut self, vehicle_id: &str, zone_id: ZoneId) {
        if self.vehicle(vehicle_id).is_none() {
            debug!(
                "Registering vehicle {} (preferred zone {})",
                vehicle_id, zone_id
            );
            self.vehicles.push(Vehicle::new(vehicle_id, zone_id));
        }
    }

    fn request_mut(&mut self, request_id: RequestId) -> Result<&mut ParkingRequest> {
        self.requests
            .get_mut(request_id)
            .ok_or(CoreError::RequestNotFound(request_id))
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn zones(&self) -> &[Zone] {
        self.registry.zones()
    }

    pub fn requests(&self) -> &[ParkingRequest] {
        &self.requests
    }

    pub fn request(&self, request_id: RequestId) -> Option<&ParkingRequest> {
        self.requests.get(request_id)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, vehicle_id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.vehicle_id == vehicle_id)
    }

    /// Number of allocations that can still be rolled back
    pub fn history_len(&self) -> usize {
        self.rollback_log.len()
    }
}
