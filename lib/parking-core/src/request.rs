//! Parking requests and their lifecycle state machine

use crate::registry::{SlotHandle, ZoneId};
use crate::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Request identifier, equal to the request's position in the request list
pub type RequestId = usize;

/// Lifecycle state of a parking request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Requested,
    Allocated,
    Occupied,
    Released,
    Cancelled,
}

impl RequestState {
    pub const ALL: [RequestState; 5] = [
        RequestState::Requested,
        RequestState::Allocated,
        RequestState::Occupied,
        RequestState::Released,
        RequestState::Cancelled,
    ];

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Requested, Allocated)
                | (Requested, Cancelled)
                | (Allocated, Occupied)
                | (Allocated, Cancelled)
                | (Occupied, Released)
        )
    }

    /// Released and cancelled requests never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Released | RequestState::Cancelled)
    }

    /// Allocated or occupied: the request currently holds a slot
    pub fn holds_slot(self) -> bool {
        matches!(self, RequestState::Allocated | RequestState::Occupied)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestState::Requested => "REQUESTED",
            RequestState::Allocated => "ALLOCATED",
            RequestState::Occupied => "OCCUPIED",
            RequestState::Released => "RELEASED",
            RequestState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vehicle's claim on a slot
#[derive(Clone, Debug, Serialize)]
pub struct ParkingRequest {
    request_id: RequestId,
    vehicle_id: String,
    requested_zone: ZoneId,
    request_time: DateTime<Utc>,
    state: RequestState,
    allocated_slot: Option<SlotHandle>,
}

impl ParkingRequest {
    /// Create a request in the `Requested` state
    pub fn new(
        request_id: RequestId,
        vehicle_id: impl Into<String>,
        requested_zone: ZoneId,
        request_time: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id,
            vehicle_id: vehicle_id.into(),
            requested_zone,
            request_time,
            state: RequestState::Requested,
            allocated_slot: None,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn requested_zone(&self) -> ZoneId {
        self.requested_zone
    }

    pub fn request_time(&self) -> DateTime<Utc> {
        self.request_time
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Slot assigned to this request, if any
    pub fn allocated_slot(&self) -> Option<SlotHandle> {
        self.allocated_slot
    }

    pub(crate) fn set_allocated_slot(&mut self, slot: Option<SlotHandle>) {
        self.allocated_slot = slot;
    }

    /// Move to `next` if the lifecycle allows it; otherwise leave the
    /// request untouched and return `InvalidTransition`.
    pub fn change_state(&mut self, next: RequestState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            warn!(
                "Invalid state transition for request {}: {} -> {}",
                self.request_id, self.state, next
            );
            return Err(CoreError::InvalidTransition {
                request_id: self.request_id,
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Overwrite the state without consulting the lifecycle table.
    ///
    /// Only the rollback log calls this, to move a request back to the state
    /// it had before an undone allocation.
    pub(crate) fn force_restore_state(&mut self, state: RequestState) {
        self.state = state;
    }
}
