//! Positioning engine capability.
//!
//! The bridge never computes a position itself. It drives an engine through
//! two traits:
//!
//! - [`EngineFactory`] - process-level setup (privacy consent, access
//!   credential) and handle construction
//! - [`LocationEngine`] - one engine handle: configuration, callback
//!   registration, start/stop
//!
//! Engines deliver [`RawLocationReport`]s to every registered
//! [`LocationSink`] from their own thread.
//!
//! # Threading contract
//!
//! Implementations must not invoke a sink synchronously from inside
//! `configure`, `register_callback`, `start` or `stop`, and `stop` must not
//! wait for an in-flight delivery to finish. The controller holds its state
//! lock across these calls and the sink takes the same lock.

mod simulated;

use std::sync::Arc;

use thiserror::Error;

use crate::event::RawLocationReport;
use crate::options::EngineOptions;

pub use simulated::{demo_script, SimulatedEngine, SimulatedEngineFactory};

/// Errors raised by an engine while setting up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The access credential was rejected.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// The engine handle could not be constructed.
    #[error("Engine construction failed: {0}")]
    Construction(String),
}

/// Receiver for raw location callbacks.
pub trait LocationSink: Send + Sync {
    /// Called once per fix attempt, serially, from the engine's thread.
    fn on_receive_location(&self, report: &RawLocationReport);
}

/// A live engine handle.
///
/// Sinks are identified by pointer: `unregister_callback` removes the sink
/// for which `Arc::ptr_eq` holds. Registering the same sink twice and
/// unregistering an unknown sink are both harmless.
pub trait LocationEngine: Send + Sync {
    /// Apply an option set. Takes effect immediately, including while started.
    fn configure(&self, options: &EngineOptions);

    fn register_callback(&self, sink: Arc<dyn LocationSink>);

    fn unregister_callback(&self, sink: &Arc<dyn LocationSink>);

    /// Begin producing fixes.
    fn start(&self);

    /// Stop producing fixes. Safe to call when not started.
    fn stop(&self);

    fn is_started(&self) -> bool;
}

/// Creates engine handles.
pub trait EngineFactory: Send + Sync {
    /// Record the user's privacy consent. Engines that do not gate on consent
    /// can ignore it.
    fn agree_privacy(&self, _agreed: bool) {}

    /// Install the access credential used by subsequently created handles.
    fn set_credential(&self, credential: &str) -> Result<(), EngineError>;

    /// Construct a new, stopped engine handle.
    fn create(&self) -> Result<Box<dyn LocationEngine>, EngineError>;
}

impl<F: EngineFactory + ?Sized> EngineFactory for Arc<F> {
    fn agree_privacy(&self, agreed: bool) {
        (**self).agree_privacy(agreed)
    }

    fn set_credential(&self, credential: &str) -> Result<(), EngineError> {
        (**self).set_credential(credential)
    }

    fn create(&self) -> Result<Box<dyn LocationEngine>, EngineError> {
        (**self).create()
    }
}
