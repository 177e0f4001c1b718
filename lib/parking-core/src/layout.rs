//! Facility layout configuration
//!
//! A layout describes zones, their areas and how many slots each area holds.
//! It can be read from YAML or JSON:
//!
//! ```yaml
//! zones:
//!   - id: 1
//!     adjacentZones: [2]
//!     areas:
//!       - areaId: 1
//!         slots: 7
//! ```

use crate::registry::{Area, AreaId, Zone, ZoneId};
use crate::{CoreError, ParkingSystem, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Complete facility description
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityLayout {
    pub zones: Vec<ZoneLayout>,
}

/// One zone of the facility
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneLayout {
    pub id: ZoneId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjacent_zones: Vec<ZoneId>,

    #[serde(default)]
    pub areas: Vec<AreaLayout>,
}

/// One area of a zone and its slot count
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaLayout {
    pub area_id: AreaId,
    pub slots: u32,
}

impl FacilityLayout {
    /// Two single-area zones: seven slots in zone 1, six in zone 2
    pub fn demo() -> Self {
        Self {
            zones: vec![
                ZoneLayout {
                    id: 1,
                    adjacent_zones: vec![2],
                    areas: vec![AreaLayout {
                        area_id: 1,
                        slots: 7,
                    }],
                },
                ZoneLayout {
                    id: 2,
                    adjacent_zones: vec![1],
                    areas: vec![AreaLayout {
                        area_id: 1,
                        slots: 6,
                    }],
                },
            ],
        }
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a layout file, choosing the format from the extension.
    ///
    /// `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        debug!("Loading facility layout from {}", path.display());
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Validate the layout and build registry zones from it
    pub fn build_zones(&self) -> Result<Vec<Zone>> {
        let mut seen = HashSet::new();
        let mut zones = Vec::with_capacity(self.zones.len());

        for zone_layout in &self.zones {
            if !seen.insert(zone_layout.id) {
                return Err(CoreError::InvalidLayout(format!(
                    "duplicate zone id {}",
                    zone_layout.id
                )));
            }

            let mut area_ids = HashSet::new();
            let mut zone = Zone::new(zone_layout.id);
            for area in &zone_layout.areas {
                if !area_ids.insert(area.area_id) {
                    return Err(CoreError::InvalidLayout(format!(
                        "duplicate area id {} in zone {}",
                        area.area_id, zone_layout.id
                    )));
                }
                zone.add_area(Area::with_slots(area.area_id, zone_layout.id, area.slots));
            }
            for adjacent in &zone_layout.adjacent_zones {
                zone.add_adjacent_zone(*adjacent)?;
            }
            zones.push(zone);
        }

        Ok(zones)
    }

    /// Build a parking system populated with this layout
    pub fn build_system(&self) -> Result<ParkingSystem> {
        Ok(ParkingSystem::with_zones(self.build_zones()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MAX_ADJACENT_ZONES;

    #[test]
    fn test_demo_layout() {
        let system = FacilityLayout::demo().build_system().unwrap();
        assert_eq!(system.zones().len(), 2);
        assert_eq!(system.registry().total_slots(), 13);
        assert_eq!(system.zones()[0].adjacent_zones(), &[2]);

        let slot_ids: Vec<_> = system.zones()[1].slots().map(|s| s.slot_id()).collect();
        assert_eq!(slot_ids, vec![1, 2, 3, 4, 5, 6]);
        assert!(system.zones()[1].slots().all(|s| s.zone_id() == 2));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
zones:
  - id: 1
    adjacentZones: [2]
    areas:
      - areaId: 1
        slots: 2
      - areaId: 2
        slots: 3
  - id: 2
    areas:
      - areaId: 1
        slots: 1
"#;
        let layout = FacilityLayout::from_yaml_str(yaml).unwrap();
        assert_eq!(layout.zones.len(), 2);
        assert_eq!(
            layout.zones[0].areas[1],
            AreaLayout {
                area_id: 2,
                slots: 3,
            }
        );
        assert!(layout.zones[1].adjacent_zones.is_empty());

        let zones = layout.build_zones().unwrap();
        assert_eq!(zones[0].slot_count(), 5);
        assert_eq!(zones[0].areas().len(), 2);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"zones":[{"id":3,"areas":[{"areaId":1,"slots":4}]}]}"#;
        let layout = FacilityLayout::from_json_str(json).unwrap();
        assert_eq!(layout.zones[0].id, 3);
        assert_eq!(layout.build_zones().unwrap()[0].slot_count(), 4);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            FacilityLayout::from_yaml_str("zones: [ { id: one } ]"),
            Err(CoreError::Yaml(_))
        ));
        assert!(matches!(
            FacilityLayout::from_json_str("{\"zones\": 3}"),
            Err(CoreError::SerializationError(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut layout = FacilityLayout::demo();
        layout.zones[1].id = 1;
        assert!(matches!(
            layout.build_zones(),
            Err(CoreError::InvalidLayout(_))
        ));

        let mut layout = FacilityLayout::demo();
        layout.zones[0].areas.push(AreaLayout {
            area_id: 1,
            slots: 2,
        });
        assert!(matches!(
            layout.build_zones(),
            Err(CoreError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_adjacency_validated() {
        let mut layout = FacilityLayout::demo();
        layout.zones[0].adjacent_zones = vec![1];
        assert!(matches!(
            layout.build_zones(),
            Err(CoreError::InvalidAdjacency { zone_id: 1 })
        ));

        let mut layout = FacilityLayout::demo();
        layout.zones[0].adjacent_zones = (100..100 + MAX_ADJACENT_ZONES as ZoneId + 1).collect();
        assert!(matches!(
            layout.build_zones(),
            Err(CoreError::AdjacencyLimit { zone_id: 1 })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            FacilityLayout::load("/nonexistent/parking-layout.yaml"),
            Err(CoreError::Io(_))
        ));
    }
}
