//! Core parking allocation functionality
//!
//! This library provides:
//! - Slot registry organised as zones, areas and slots
//! - Two-phase allocation policy with cross-zone fallback
//! - Request lifecycle state machine
//! - Rollback log for undoing allocations
//! - Orchestrator and a shared, lock-serialized service handle

pub mod allocation;
pub mod error;
pub mod layout;
pub mod registry;
pub mod request;
pub mod rollback;
pub mod service;
pub mod system;
pub mod vehicle;

pub use allocation::AllocationEngine;
pub use error::{CoreError, Result};
pub use layout::FacilityLayout;
pub use registry::{Area, Slot, SlotHandle, SlotRegistry, Zone, ZoneId};
pub use request::{ParkingRequest, RequestId, RequestState};
pub use rollback::{RollbackLog, RollbackRecord};
pub use service::ParkingService;
pub use system::ParkingSystem;
pub use vehicle::Vehicle;
