//! Vehicle records
use crate::registry::ZoneId;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub vehicle_id: String,
    pub preferred_zone: ZoneId,
}

impl Vehicle {
    pub fn new(vehicle_id: impl Into<String>, preferred_zone: ZoneId) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            preferred_zone,
        }
    }
}
