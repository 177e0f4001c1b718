//! Compensating-action history for slot allocations

use crate::registry::{SlotHandle, SlotRegistry};
use crate::request::{ParkingRequest, RequestId, RequestState};
use tracing::{debug, warn};

/// Pre-allocation state captured so an allocation can be undone
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollbackRecord {
    pub slot: SlotHandle,
    pub previous_availability: bool,
    pub request_id: RequestId,
    pub previous_state: RequestState,
}

/// History of allocations that have not been undone yet.
///
/// Records reference slots and requests through handles and ids, never
/// through borrows, so the registry and request list may grow freely while
/// records are outstanding.
#[derive(Clone, Debug, Default)]
pub struct RollbackLog {
    history: Vec<RollbackRecord>,
}

impl RollbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one allocation
    pub fn record(&mut self, record: RollbackRecord) {
        self.history.push(record);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Most recent record
    pub fn last(&self) -> Option<&RollbackRecord> {
        self.history.last()
    }

    /// Whether an outstanding record exists for `request_id`
    pub fn contains(&self, request_id: RequestId) -> bool {
        self.history.iter().any(|r| r.request_id == request_id)
    }

    /// Undo up to `k` of the most recent allocations, newest first.
    ///
    /// Each undone record restores the slot's captured availability and the
    /// request's captured state. Asking for more than the history holds
    /// empties it. Returns the number of records undone.
    pub fn rollback(
        &mut self,
        k: usize,
        registry: &mut SlotRegistry,
        requests: &mut [ParkingRequest],
    ) -> usize {
        let mut undone = 0;
        while undone < k {
            let Some(record) = self.history.pop() else {
                break;
            };
            Self::restore_slot(&record, registry);
            match requests.get_mut(record.request_id) {
                Some(request) => {
                    request.force_restore_state(record.previous_state);
                    request.set_allocated_slot(None);
                }
                None => warn!(
                    "Rollback record references unknown request {}",
                    record.request_id
                ),
            }
            undone += 1;
        }
        debug!(
            "Rolled back {} allocations, {} remaining",
            undone,
            self.history.len()
        );
        undone
    }

    /// Undo the allocation recorded for `request_id`, wherever it sits in
    /// the history.
    ///
    /// Only the slot is restored; the request keeps whatever state the
    /// caller has just moved it to. Returns the removed record, if any.
    pub fn undo_request(
        &mut self,
        request_id: RequestId,
        registry: &mut SlotRegistry,
    ) -> Option<RollbackRecord> {
        let pos = self
            .history
            .iter()
            .rposition(|r| r.request_id == request_id)?;
        let record = self.history.remove(pos);
        Self::restore_slot(&record, registry);
        debug!(
            "Undid allocation of request {} ({:?})",
            request_id, record.slot
        );
        Some(record)
    }

    fn restore_slot(record: &RollbackRecord, registry: &mut SlotRegistry) {
        if registry
            .set_available(record.slot, record.previous_availability)
            .is_none()
        {
            warn!("Rollback record references unknown slot {:?}", record.slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Area, Zone};
    use chrono::Utc;

    /// Allocate the first free slot of zone 1 to a fresh request, the way
    /// the orchestrator does.
    fn allocate(
        log: &mut RollbackLog,
        registry: &mut SlotRegistry,
        requests: &mut Vec<ParkingRequest>,
    ) -> (RequestId, SlotHandle) {
        let slot = registry.find_first_available(1).unwrap();
        let request_id = requests.len();
        let mut request =
            ParkingRequest::new(request_id, format!("V{}", request_id), 1, Utc::now());
        let previous_availability = registry.set_available(slot, false).unwrap();
        request.change_state(RequestState::Allocated).unwrap();
        request.set_allocated_slot(Some(slot));
        requests.push(request);
        log.record(RollbackRecord {
            slot,
            previous_availability,
            request_id,
            previous_state: RequestState::Requested,
        });
        (request_id, slot)
    }

    fn registry(slots: u32) -> SlotRegistry {
        let mut zone = Zone::new(1);
        zone.add_area(Area::with_slots(1, 1, slots));
        let mut registry = SlotRegistry::new();
        registry.add_zone(zone);
        registry
    }

    #[test]
    fn test_rollback_is_lifo() {
        let mut registry = registry(2);
        let mut requests = Vec::new();
        let mut log = RollbackLog::new();

        let (a1, s1) = allocate(&mut log, &mut registry, &mut requests);
        let (a2, s2) = allocate(&mut log, &mut registry, &mut requests);
        assert_eq!(log.len(), 2);

        assert_eq!(log.rollback(1, &mut registry, &mut requests), 1);

        assert!(registry.slot(s2).unwrap().is_available());
        assert_eq!(requests[a2].state(), RequestState::Requested);
        assert!(requests[a2].allocated_slot().is_none());

        assert!(!registry.slot(s1).unwrap().is_available());
        assert_eq!(requests[a1].state(), RequestState::Allocated);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_rollback_saturates() {
        let mut registry = registry(3);
        let mut requests = Vec::new();
        let mut log = RollbackLog::new();

        for _ in 0..3 {
            allocate(&mut log, &mut registry, &mut requests);
        }

        assert_eq!(log.rollback(10, &mut registry, &mut requests), 3);
        assert!(log.is_empty());
        assert_eq!(registry.available_slots(), 3);

        assert_eq!(log.rollback(1, &mut registry, &mut requests), 0);
        assert_eq!(log.rollback(0, &mut registry, &mut requests), 0);
    }

    #[test]
    fn test_undo_request_out_of_order() {
        let mut registry = registry(3);
        let mut requests = Vec::new();
        let mut log = RollbackLog::new();

        let (first, s1) = allocate(&mut log, &mut registry, &mut requests);
        let (_, s2) = allocate(&mut log, &mut registry, &mut requests);

        let record = log.undo_request(first, &mut registry).unwrap();
        assert_eq!(record.slot, s1);
        assert!(registry.slot(s1).unwrap().is_available());
        assert!(!registry.slot(s2).unwrap().is_available());
        assert!(!log.contains(first));
        assert_eq!(log.len(), 1);

        assert!(log.undo_request(first, &mut registry).is_none());
    }

    #[test]
    fn test_unresolvable_records_are_skipped() {
        let mut registry = registry(1);
        let mut requests: Vec<ParkingRequest> = Vec::new();
        let mut log = RollbackLog::new();
        log.record(RollbackRecord {
            slot: SlotHandle {
                zone: 5,
                area: 0,
                slot: 0,
            },
            previous_availability: true,
            request_id: 17,
            previous_state: RequestState::Requested,
        });

        assert_eq!(log.rollback(1, &mut registry, &mut requests), 1);
        assert!(log.is_empty());
        assert_eq!(registry.available_slots(), 1);
    }
}
