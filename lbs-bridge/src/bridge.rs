//! Host-facing control surface.
//!
//! [`LocationBridge`] is what a host runtime integration holds. Control calls
//! map one-to-one onto the [`LifecycleController`]; `init` and
//! `get_distance` complete asynchronously and reject with a [`BridgeError`]
//! whose `code()` is what the host sees.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::channel::{BroadcastChannel, EventChannel, HostEvent};
use crate::controller::{ControllerStats, LifecycleController, LifecycleState};
use crate::distance::{distance, Coordinate};
use crate::engine::EngineFactory;
use crate::error::BridgeError;
use crate::options::{EngineOptions, OptionPatch};

/// One bridge instance. Independent instances share nothing.
pub struct LocationBridge {
    controller: LifecycleController,
    broadcast: Option<BroadcastChannel>,
}

impl LocationBridge {
    /// Bridge emitting through a host-provided channel.
    pub fn new(factory: Arc<dyn EngineFactory>, channel: Arc<dyn EventChannel>) -> Self {
        Self {
            controller: LifecycleController::new(factory, channel),
            broadcast: None,
        }
    }

    /// Bridge emitting into a broadcast channel; listeners attach with
    /// [`subscribe`](Self::subscribe).
    pub fn with_broadcast(factory: Arc<dyn EngineFactory>, capacity: usize) -> Self {
        let channel = BroadcastChannel::new(capacity);
        Self {
            controller: LifecycleController::new(factory, Arc::new(channel.clone())),
            broadcast: Some(channel),
        }
    }

    /// Initialize the engine with an access credential.
    ///
    /// Resolves `true` on success. Rejects with code `"-1"` if the credential
    /// is refused or the engine cannot be constructed.
    pub async fn init(&self, credential: &str) -> Result<bool, BridgeError> {
        self.controller.init(credential)
    }

    /// Apply a partial option map from the host.
    pub fn set_option(&self, options: &Value) {
        self.set_option_patch(&OptionPatch::from_value(options));
    }

    pub fn set_option_patch(&self, patch: &OptionPatch) {
        self.controller.set_option(patch);
    }

    pub fn start(&self) {
        self.controller.start();
    }

    pub fn stop(&self) {
        self.controller.stop();
    }

    pub fn destroy(&self) {
        self.controller.destroy();
    }

    /// Distance in meters between two `{latitude, longitude}` maps.
    ///
    /// Rejects with code `"DISTANCE_ERROR"` when either map lacks a numeric
    /// field.
    pub async fn get_distance(&self, p1: &Value, p2: &Value) -> Result<f64, BridgeError> {
        let p1 = Coordinate::from_value(p1)?;
        let p2 = Coordinate::from_value(p2)?;
        Ok(distance(p1, p2))
    }

    /// Listen for `onLocation` events.
    ///
    /// `None` when the bridge was built over a host-provided channel.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<HostEvent>> {
        self.broadcast.as_ref().map(BroadcastChannel::subscribe)
    }

    pub fn state(&self) -> LifecycleState {
        self.controller.state()
    }

    pub fn options(&self) -> EngineOptions {
        self.controller.options()
    }

    pub fn stats(&self) -> ControllerStats {
        self.controller.stats()
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }
}
