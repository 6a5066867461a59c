//! LBS Bridge - location engine adapter for host application runtimes
//!
//! Sits between a host runtime and a positioning engine. The host drives the
//! engine through a small control surface ([`LocationBridge`]) and receives
//! every fix as a normalized `onLocation` event.
//!
//! # Modules
//!
//! - [`options`] - maps partial host configuration onto engine options
//! - [`controller`] - engine lifecycle and callback registration
//! - [`event`] - raw report → canonical event normalization
//! - [`distance`] - geodesic distance between two points
//! - [`engine`] - the engine capability, plus a simulated engine
//! - [`channel`] - event delivery towards the host
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lbs_bridge::{LocationBridge, SimulatedEngineFactory};
//!
//! # async fn run() -> Result<(), lbs_bridge::BridgeError> {
//! let factory = Arc::new(SimulatedEngineFactory::with_demo_script());
//! let bridge = LocationBridge::with_broadcast(factory, 16);
//! let mut events = bridge.subscribe().expect("broadcast bridge");
//!
//! bridge.init("access-key").await?;
//! bridge.set_option(&serde_json::json!({ "scanSpan": 2000, "reGeocode": true }));
//! bridge.start();
//!
//! if let Ok(event) = events.recv().await {
//!     println!("{}: {:?}", event.name, event.payload.position());
//! }
//! bridge.destroy();
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod channel;
pub mod config;
pub mod controller;
pub mod distance;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod options;

pub use bridge::LocationBridge;
pub use channel::{BroadcastChannel, EventChannel, HostEvent, LOCATION_EVENT};
pub use controller::{ControllerStats, LifecycleController, LifecycleState};
pub use distance::{distance, Coordinate};
pub use engine::{EngineFactory, LocationEngine, LocationSink, SimulatedEngineFactory};
pub use error::BridgeError;
pub use event::{normalize, CanonicalLocationEvent, RawLocationReport};
pub use options::{build_options, EngineOptions, OptionPatch};
