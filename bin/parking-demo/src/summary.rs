//! Occupancy summary computed from a read-only view of the parking system

use parking_core::RequestState::{Allocated, Requested};
use parking_core::{ParkingSystem, ZoneId};
use tracing::info;

/// Occupancy of a single zone
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneSummary {
    pub zone_id: ZoneId,
    pub capacity: usize,
    pub occupied: usize,
}

impl ZoneSummary {
    /// Occupied share of capacity, rounded to the nearest percent
    pub fn utilization(&self) -> usize {
        round_percent(self.occupied, self.capacity)
    }
}

/// Facility-wide occupancy and request counts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacilitySummary {
    pub zones: Vec<ZoneSummary>,
    pub active_requests: usize,
}

impl FacilitySummary {
    pub fn from_system(system: &ParkingSystem) -> Self {
        let zones = system
            .zones()
            .iter()
            .map(|zone| ZoneSummary {
                zone_id: zone.zone_id(),
                capacity: zone.slot_count(),
                occupied: zone.slots().filter(|s| !s.is_available()).count(),
            })
            .collect();

        let active_requests = system
            .requests()
            .iter()
            .filter(|r| matches!(r.state(), Requested | Allocated))
            .count();

        Self {
            zones,
            active_requests,
        }
    }

    pub fn total_slots(&self) -> usize {
        self.zones.iter().map(|z| z.capacity).sum()
    }

    pub fn occupied_slots(&self) -> usize {
        self.zones.iter().map(|z| z.occupied).sum()
    }

    pub fn utilization(&self) -> usize {
        round_percent(self.occupied_slots(), self.total_slots())
    }

    pub fn log(&self) {
        for zone in &self.zones {
            info!(
                "Zone {}: {}/{} slots occupied ({}%)",
                zone.zone_id,
                zone.occupied,
                zone.capacity,
                zone.utilization()
            );
        }
        info!(
            "Facility: {} zones, {} occupied slots, {} active requests, {}% utilization",
            self.zones.len(),
            self.occupied_slots(),
            self.active_requests,
            self.utilization()
        );
    }
}

fn round_percent(numerator: usize, denominator: usize) -> usize {
    if denominator == 0 {
        return 0;
    }
    (numerator * 100 + denominator / 2) / denominator
}
