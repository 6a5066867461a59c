//! The lifecycle controller.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};

use super::state::LifecycleState;
use crate::channel::{EventChannel, LOCATION_EVENT};
use crate::engine::{EngineFactory, LocationEngine, LocationSink};
use crate::error::BridgeError;
use crate::event::{normalize, RawLocationReport, ERROR_CODE_NORMALIZATION_FAILED};
use crate::options::{build_options, EngineOptions, OptionPatch};

/// Counters for the callback path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Events pushed to the channel.
    pub emitted: u64,
    /// Callbacks dropped because the sink was retired or the engine not started.
    pub dropped: u64,
    /// Emitted events that carried `errorCode = -2`.
    pub normalization_failures: u64,
}

/// Mutable controller state.
struct ControllerInner {
    state: LifecycleState,
    engine: Option<Box<dyn LocationEngine>>,
    sink: Option<Arc<dyn LocationSink>>,
    options: EngineOptions,
    /// Identifies the current sink. Callbacks from older sinks are dropped.
    generation: u64,
    /// Credential of the last successful `init`.
    credential: Option<String>,
    stats: ControllerStats,
}

impl ControllerInner {
    /// Stop the engine and unregister the sink, releasing both.
    fn release(&mut self) {
        let sink = self.sink.take();
        if let Some(engine) = self.engine.take() {
            engine.stop();
            if let Some(sink) = sink {
                engine.unregister_callback(&sink);
            }
        }
    }
}

/// State shared between the controller and its callback sinks.
///
/// Lock order is `gate` then `inner`. Control calls hold the gate for their
/// whole duration; a callback holds it across emission but drops `inner`
/// before calling the channel, so the channel may call back into the
/// controller on the same thread.
struct Shared {
    gate: ReentrantMutex<()>,
    inner: Mutex<ControllerInner>,
}

/// Owns the engine handle and listener registration.
///
/// # State Machine
///
/// ```text
/// Uninitialized --init--> Initialized --start--> Started
///                          ^    |                   |
///                          |    +------init---------+  (re-init: old handle released)
///                          +--------stop------------+
/// any state with an engine --destroy--> Destroyed (terminal)
/// ```
///
/// Calls that do not apply to the current state are silent no-ops. Control
/// calls and event emission are serialized: once `stop` or `destroy` returns
/// on one thread, no event is emitted afterwards. The channel may itself call
/// `stop` or `destroy` from inside `emit`.
pub struct LifecycleController {
    factory: Arc<dyn EngineFactory>,
    channel: Arc<dyn EventChannel>,
    shared: Arc<Shared>,
}

impl LifecycleController {
    pub fn new(factory: Arc<dyn EngineFactory>, channel: Arc<dyn EventChannel>) -> Self {
        Self {
            factory,
            channel,
            shared: Arc::new(Shared {
                gate: ReentrantMutex::new(()),
                inner: Mutex::new(ControllerInner {
                    state: LifecycleState::Uninitialized,
                    engine: None,
                    sink: None,
                    options: EngineOptions::default(),
                    generation: 0,
                    credential: None,
                    stats: ControllerStats::default(),
                }),
            }),
        }
    }

    /// Acquire an engine handle and register a fresh callback sink.
    ///
    /// Re-entrant: a handle from an earlier `init` is stopped and its sink
    /// unregistered before the new one is installed. Options reset to the
    /// defaults. On failure the controller is left exactly as it was, and the
    /// factory is handed back the credential of the last successful `init`.
    ///
    /// Returns `Ok(false)` without doing anything once destroyed.
    pub fn init(&self, credential: &str) -> Result<bool, BridgeError> {
        let _gate = self.shared.gate.lock();
        let mut inner = self.shared.inner.lock();
        if inner.state.is_terminal() {
            tracing::debug!("init ignored: controller destroyed");
            return Ok(false);
        }

        self.factory.agree_privacy(true);
        if let Err(e) = self.factory.set_credential(credential) {
            tracing::warn!(error = %e, "Engine rejected credential");
            return Err(e.into());
        }
        let options = build_options(&EngineOptions::default(), &OptionPatch::default());
        let engine = match self.factory.create() {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to construct engine handle");
                self.restore_credential(inner.credential.as_deref());
                return Err(e.into());
            }
        };
        engine.configure(&options);

        if inner.engine.is_some() {
            tracing::debug!(
                generation = inner.generation,
                "Releasing engine from previous init"
            );
            inner.release();
        }

        inner.generation += 1;
        let sink: Arc<dyn LocationSink> = Arc::new(CallbackSink {
            generation: inner.generation,
            shared: Arc::downgrade(&self.shared),
            channel: Arc::clone(&self.channel),
        });
        engine.register_callback(Arc::clone(&sink));

        inner.engine = Some(engine);
        inner.sink = Some(sink);
        inner.options = options;
        inner.credential = Some(credential.to_string());
        inner.state = LifecycleState::Initialized;

        tracing::info!(generation = inner.generation, "Location engine initialized");
        Ok(true)
    }

    fn restore_credential(&self, previous: Option<&str>) {
        let Some(previous) = previous else {
            return;
        };
        if let Err(e) = self.factory.set_credential(previous) {
            tracing::warn!(error = %e, "Failed to restore previous credential");
        }
    }

    /// Merge `patch` into the current options and apply them immediately.
    pub fn set_option(&self, patch: &OptionPatch) {
        let _gate = self.shared.gate.lock();
        let mut inner = self.shared.inner.lock();
        let options = build_options(&inner.options, patch);
        let Some(engine) = inner.engine.as_deref() else {
            tracing::debug!(state = %inner.state, "set_option ignored: no engine");
            return;
        };
        engine.configure(&options);

        tracing::debug!(
            mode = ?options.location_mode(),
            coordinate_system = %options.coordinate_system(),
            scan_interval_ms = options.scan_interval_ms(),
            re_geocode = options.need_address(),
            "Engine options updated"
        );
        inner.options = options;
    }

    /// Start producing fixes. No-op if already started or not initialized.
    pub fn start(&self) {
        let _gate = self.shared.gate.lock();
        let mut inner = self.shared.inner.lock();
        let Some(engine) = inner.engine.as_deref() else {
            tracing::debug!(state = %inner.state, "start ignored: no engine");
            return;
        };

        let already_started = engine.is_started();
        if !already_started {
            engine.start();
        }
        inner.state = LifecycleState::Started;

        if already_started {
            tracing::debug!("start ignored: engine already started");
        } else {
            tracing::info!("Location engine started");
        }
    }

    /// Stop producing fixes. The handle and sink stay registered.
    pub fn stop(&self) {
        let _gate = self.shared.gate.lock();
        let mut inner = self.shared.inner.lock();
        let Some(engine) = inner.engine.as_deref() else {
            tracing::debug!(state = %inner.state, "stop ignored: no engine");
            return;
        };
        engine.stop();
        inner.state = LifecycleState::Initialized;
        tracing::info!("Location engine stopped");
    }

    /// Stop the engine and release the handle and sink. Terminal.
    pub fn destroy(&self) {
        let _gate = self.shared.gate.lock();
        let mut inner = self.shared.inner.lock();
        if !inner.state.has_engine() {
            tracing::debug!(state = %inner.state, "destroy ignored: no engine");
            return;
        }
        inner.release();
        inner.state = LifecycleState::Destroyed;
        tracing::info!(stats = ?inner.stats, "Location engine destroyed");
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.inner.lock().state
    }

    /// The options currently applied to the engine (defaults before `init`).
    pub fn options(&self) -> EngineOptions {
        self.shared.inner.lock().options.clone()
    }

    pub fn stats(&self) -> ControllerStats {
        self.shared.inner.lock().stats
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        let _gate = self.shared.gate.lock();
        self.shared.inner.lock().release();
    }
}

/// The sink registered with the engine on each `init`.
///
/// Holds the controller state weakly: the engine owns the sink, and the
/// controller owns the engine.
struct CallbackSink {
    generation: u64,
    shared: Weak<Shared>,
    channel: Arc<dyn EventChannel>,
}

impl LocationSink for CallbackSink {
    fn on_receive_location(&self, report: &RawLocationReport) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let _gate = shared.gate.lock();

        let event = {
            let mut inner = shared.inner.lock();
            if inner.generation != self.generation || inner.state != LifecycleState::Started {
                inner.stats.dropped += 1;
                tracing::trace!(
                    sink_generation = self.generation,
                    generation = inner.generation,
                    state = %inner.state,
                    "Location callback dropped"
                );
                return;
            }

            let event = normalize(report);
            if event.error_code == ERROR_CODE_NORMALIZATION_FAILED {
                inner.stats.normalization_failures += 1;
                tracing::warn!(
                    error = event.error_message.as_deref().unwrap_or_default(),
                    "Location report could not be normalized"
                );
            }
            inner.stats.emitted += 1;
            event
        };

        tracing::trace!(error_code = event.error_code, "Emitting location event");
        self.channel.emit(LOCATION_EVENT, event);
    }
}
