use crate::registry::ZoneId;
use crate::request::{RequestId, RequestState};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No slot available in zone {zone_id} or any other zone")]
    NoSlotAvailable { zone_id: ZoneId },

    #[error("Request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Request {request_id} is already {state}")]
    AlreadyTerminal {
        request_id: RequestId,
        state: RequestState,
    },

    #[error("Request {request_id} cannot be released while {state}")]
    NotReleasable {
        request_id: RequestId,
        state: RequestState,
    },

    #[error("Invalid state transition for request {request_id}: {from} -> {to}")]
    InvalidTransition {
        request_id: RequestId,
        from: RequestState,
        to: RequestState,
    },

    #[error("Zone {zone_id} already has the maximum number of adjacent zones")]
    AdjacencyLimit { zone_id: ZoneId },

    #[error("Zone {zone_id} cannot be adjacent to itself")]
    InvalidAdjacency { zone_id: ZoneId },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
