//! Allocation policy for choosing a slot across zones

use crate::registry::{SlotHandle, Zone, ZoneId};
use tracing::debug;

/// Stateless slot allocation policy.
///
/// Prefers the first available slot in the requested zone; if that zone is
/// full (or unknown) falls back to the first available slot of any other
/// zone, in registry order.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllocationEngine;

impl AllocationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Select a slot for a request preferring `preferred_zone`
    pub fn allocate(&self, preferred_zone: ZoneId, zones: &[Zone]) -> Option<SlotHandle> {
        if zones.is_empty() {
            return None;
        }

        if let Some(handle) = self.allocate_in_zone(preferred_zone, zones) {
            return Some(handle);
        }

        let handle = self.allocate_cross_zone(preferred_zone, zones)?;
        debug!(
            "Zone {} has no free slot, falling back to zone {}",
            preferred_zone,
            zones[handle.zone].zone_id()
        );
        Some(handle)
    }

    /// Search only the first zone registered under `zone_id`
    fn allocate_in_zone(&self, zone_id: ZoneId, zones: &[Zone]) -> Option<SlotHandle> {
        let zone = zones.iter().position(|z| z.zone_id() == zone_id)?;
        Self::first_available(zone, &zones[zone])
    }

    /// Search every zone except the ones registered under `excluded`
    fn allocate_cross_zone(&self, excluded: ZoneId, zones: &[Zone]) -> Option<SlotHandle> {
        zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.zone_id() != excluded)
            .find_map(|(idx, z)| Self::first_available(idx, z))
    }

    fn first_available(zone_idx: usize, zone: &Zone) -> Option<SlotHandle> {
        zone.find_first_available().map(|(area, slot)| SlotHandle {
            zone: zone_idx,
            area,
            slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Area, SlotRegistry};

    fn registry(layout: &[(ZoneId, u32)]) -> SlotRegistry {
        let mut registry = SlotRegistry::new();
        for (zone_id, slots) in layout {
            let mut zone = Zone::new(*zone_id);
            zone.add_area(Area::with_slots(1, *zone_id, *slots));
            registry.add_zone(zone);
        }
        registry
    }

    fn fill_zone(registry: &mut SlotRegistry, zone: usize) {
        while let Some(handle) = registry.first_available_at(zone) {
            registry.set_available(handle, false);
        }
    }

    #[test]
    fn test_empty_zone_list() {
        let engine = AllocationEngine::new();
        assert!(engine.allocate(1, &[]).is_none());
    }

    #[test]
    fn test_prefers_requested_zone() {
        let engine = AllocationEngine::new();
        let registry = registry(&[(1, 2), (2, 2), (3, 2)]);

        let handle = engine.allocate(2, registry.zones()).unwrap();
        assert_eq!(handle.zone, 1);
        assert_eq!(registry.slot(handle).unwrap().zone_id(), 2);
    }

    #[test]
    fn test_falls_back_in_registry_order() {
        let engine = AllocationEngine::new();
        let mut registry = registry(&[(1, 1), (2, 1), (3, 1)]);
        fill_zone(&mut registry, 1);

        let handle = engine.allocate(2, registry.zones()).unwrap();
        assert_eq!(registry.zones()[handle.zone].zone_id(), 1);

        fill_zone(&mut registry, 0);
        let handle = engine.allocate(2, registry.zones()).unwrap();
        assert_eq!(registry.zones()[handle.zone].zone_id(), 3);
    }

    #[test]
    fn test_unknown_zone_falls_back() {
        let engine = AllocationEngine::new();
        let registry = registry(&[(1, 1), (2, 1)]);

        let handle = engine.allocate(42, registry.zones()).unwrap();
        assert_eq!(handle.zone, 0);
    }

    #[test]
    fn test_exhaustion() {
        let engine = AllocationEngine::new();
        let mut registry = registry(&[(1, 1), (2, 1)]);
        fill_zone(&mut registry, 0);
        fill_zone(&mut registry, 1);

        assert!(engine.allocate(1, registry.zones()).is_none());
    }

    #[test]
    fn test_duplicate_zone_ids_are_skipped_in_fallback() {
        let engine = AllocationEngine::new();
        // The second zone shares id 1 with the first
        let mut registry = registry(&[(1, 1), (1, 1), (2, 1)]);
        fill_zone(&mut registry, 0);

        let handle = engine.allocate(1, registry.zones()).unwrap();
        assert_eq!(handle.zone, 2);

        fill_zone(&mut registry, 2);
        assert!(engine.allocate(1, registry.zones()).is_none());
    }
}
