//! Errors surfaced through the bridge control surface.
//!
//! Only directly invoked calls fail. Anything on the callback path becomes an
//! emitted event instead.

use thiserror::Error;

use crate::distance::InvalidCoordinateError;
use crate::engine::EngineError;

/// Rejection code for a failed `init`.
pub const CODE_INITIALIZATION: &str = "-1";
/// Rejection code for a malformed `get_distance` call.
pub const CODE_DISTANCE: &str = "DISTANCE_ERROR";

/// A rejected control-surface call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Credential rejected or engine construction failed.
    #[error("Initialization failed: {0}")]
    Initialization(#[from] EngineError),

    /// A distance endpoint was structurally malformed.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] InvalidCoordinateError),
}

impl BridgeError {
    /// Stable rejection code, as surfaced to the host.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Initialization(_) => CODE_INITIALIZATION,
            BridgeError::InvalidCoordinate(_) => CODE_DISTANCE,
        }
    }
}
