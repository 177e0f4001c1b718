//! Slot registry: the Zone -> Area -> Slot hierarchy

use crate::{CoreError, Result};
use serde::Serialize;
use tracing::{debug, warn};

pub type ZoneId = u32;
pub type AreaId = u32;
pub type SlotId = u32;

/// Upper bound on the adjacent zones a single zone may declare
pub const MAX_ADJACENT_ZONES: usize = 10;

/// Positional handle to a slot inside the registry.
///
/// Zones, areas and slots are never removed or reordered once added, so a
/// handle stays valid for the lifetime of the registry that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SlotHandle {
    pub zone: usize,
    pub area: usize,
    pub slot: usize,
}

/// A single parking slot, the unit of allocation
#[derive(Clone, Debug, Serialize)]
pub struct Slot {
    slot_id: SlotId,
    zone_id: ZoneId,
    available: bool,
}

impl Slot {
    /// Create a new slot, initially available
    pub fn new(slot_id: SlotId, zone_id: ZoneId) -> Self {
        Self {
            slot_id,
            zone_id,
            available: true,
        }
    }

    pub fn slot_id(&self) -> SlotId {
        self.slot_id
    }

    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

/// An ordered group of slots inside a zone
#[derive(Clone, Debug, Serialize)]
pub struct Area {
    area_id: AreaId,
    slots: Vec<Slot>,
}

impl Area {
    pub fn new(area_id: AreaId) -> Self {
        Self {
            area_id,
            slots: Vec::new(),
        }
    }

    /// Create an area holding `count` slots numbered from 1
    pub fn with_slots(area_id: AreaId, zone_id: ZoneId, count: u32) -> Self {
        let mut area = Self::new(area_id);
        for slot_id in 1..=count {
            area.add_slot(Slot::new(slot_id, zone_id));
        }
        area
    }

    pub fn area_id(&self) -> AreaId {
        self.area_id
    }

    pub fn add_slot(&mut self, slot: Slot) {
        self.slots.push(slot);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Index of the first available slot, in insertion order
    pub fn first_available(&self) -> Option<usize> {
        self.slots.iter().position(Slot::is_available)
    }
}

/// Top-level partition of the facility
#[derive(Clone, Debug, Serialize)]
pub struct Zone {
    zone_id: ZoneId,
    areas: Vec<Area>,
    // Reserved for zone-graph routing; allocation does not consult it yet.
    adjacent_zones: Vec<ZoneId>,
}

impl Zone {
    pub fn new(zone_id: ZoneId) -> Self {
        Self {
            zone_id,
            areas: Vec::new(),
            adjacent_zones: Vec::new(),
        }
    }

    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    pub fn add_area(&mut self, area: Area) {
        self.areas.push(area);
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn adjacent_zones(&self) -> &[ZoneId] {
        &self.adjacent_zones
    }

    /// Declare another zone as adjacent to this one
    pub fn add_adjacent_zone(&mut self, zone_id: ZoneId) -> Result<()> {
        if zone_id == self.zone_id {
            return Err(CoreError::InvalidAdjacency {
                zone_id: self.zone_id,
            });
        }
        if self.adjacent_zones.contains(&zone_id) {
            return Ok(());
        }
        if self.adjacent_zones.len() >= MAX_ADJACENT_ZONES {
            return Err(CoreError::AdjacencyLimit {
                zone_id: self.zone_id,
            });
        }
        self.adjacent_zones.push(zone_id);
        Ok(())
    }

    /// Total number of slots across all areas
    pub fn slot_count(&self) -> usize {
        self.areas.iter().map(|a| a.slots.len()).sum()
    }

    /// Iterate every slot of the zone in search order
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.areas.iter().flat_map(|a| a.slots.iter())
    }

    /// Position (area index, slot index) of the first available slot
    pub fn find_first_available(&self) -> Option<(usize, usize)> {
        self.areas
            .iter()
            .enumerate()
            .find_map(|(area_idx, area)| {
                area.first_available().map(|slot_idx| (area_idx, slot_idx))
            })
    }
}

/// Registry of every zone in the facility
#[derive(Clone, Debug, Default, Serialize)]
pub struct SlotRegistry {
    zones: Vec<Zone>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone with its pre-populated areas and slots
    pub fn add_zone(&mut self, zone: Zone) {
        if self.zone(zone.zone_id).is_some() {
            // Lookups by id only ever see the first zone registered under it.
            warn!("Zone {} registered more than once", zone.zone_id);
        }
        debug!(
            "Registered zone {} with {} areas and {} slots",
            zone.zone_id,
            zone.areas.len(),
            zone.slot_count()
        );
        self.zones.push(zone);
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// First zone registered under `zone_id`
    pub fn zone(&self, zone_id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.zone_id == zone_id)
    }

    /// First available slot of the first zone registered under `zone_id`
    pub fn find_first_available(&self, zone_id: ZoneId) -> Option<SlotHandle> {
        let zone = self.zones.iter().position(|z| z.zone_id == zone_id)?;
        self.first_available_at(zone)
    }

    /// First available slot of the zone at position `zone`
    pub fn first_available_at(&self, zone: usize) -> Option<SlotHandle> {
        let (area, slot) = self.zones.get(zone)?.find_first_available()?;
        Some(SlotHandle { zone, area, slot })
    }

    /// Resolve a handle to its slot
    pub fn slot(&self, handle: SlotHandle) -> Option<&Slot> {
        self.zones
            .get(handle.zone)?
            .areas
            .get(handle.area)?
            .slots
            .get(handle.slot)
    }

    fn slot_mut(&mut self, handle: SlotHandle) -> Option<&mut Slot> {
        self.zones
            .get_mut(handle.zone)?
            .areas
            .get_mut(handle.area)?
            .slots
            .get_mut(handle.slot)
    }

    /// Set the availability of the slot behind `handle`.
    ///
    /// Returns the previous availability, or `None` if the handle does not
    /// resolve.
    pub(crate) fn set_available(&mut self, handle: SlotHandle, available: bool) -> Option<bool> {
        let slot = self.slot_mut(handle)?;
        let previous = slot.available;
        slot.set_available(available);
        Some(previous)
    }

    pub fn total_slots(&self) -> usize {
        self.zones.iter().map(Zone::slot_count).sum()
    }

    pub fn available_slots(&self) -> usize {
        self.zones
            .iter()
            .flat_map(|z| z.slots())
            .filter(|s| s.is_available())
            .count()
    }
}
