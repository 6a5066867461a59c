//! Event channel towards the host runtime.
//!
//! The host supplies a single named-event emission function. There is no
//! acknowledgment and no backpressure: `emit` must not block.
//!
//! Two ready-made channels exist:
//!
//! - any `Fn(&str, CanonicalLocationEvent)` closure
//! - [`BroadcastChannel`] - fan-out to tokio subscribers, the Rust analogue
//!   of a host event emitter with `addListener`

use tokio::sync::broadcast;

use crate::event::CanonicalLocationEvent;

/// Name of the event carrying normalized location callbacks.
pub const LOCATION_EVENT: &str = "onLocation";

/// Default buffer size for [`BroadcastChannel`].
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Host-provided emission facility.
pub trait EventChannel: Send + Sync {
    /// Deliver one event. Fire-and-forget.
    fn emit(&self, name: &str, payload: CanonicalLocationEvent);
}

impl<F> EventChannel for F
where
    F: Fn(&str, CanonicalLocationEvent) + Send + Sync,
{
    fn emit(&self, name: &str, payload: CanonicalLocationEvent) {
        self(name, payload)
    }
}

/// A named event as seen by broadcast subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    pub name: String,
    pub payload: CanonicalLocationEvent,
}

/// Broadcast-backed event channel.
///
/// Slow subscribers lag and lose the oldest events rather than blocking the
/// engine thread. Emitting with no subscribers drops the event.
#[derive(Debug, Clone)]
pub struct BroadcastChannel {
    tx: broadcast::Sender<HostEvent>,
}

impl BroadcastChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Add a listener. Events emitted before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl EventChannel for BroadcastChannel {
    fn emit(&self, name: &str, payload: CanonicalLocationEvent) {
        let event = HostEvent {
            name: name.to_string(),
            payload,
        };
        if self.tx.send(event).is_err() {
            tracing::trace!(event = name, "No listeners for event, dropped");
        }
    }
}
