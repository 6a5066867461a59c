//! Integration tests for the bridge over the simulated engine.
//!
//! These tests drive the public control surface end to end:
//! - init → set_option → start → onLocation events → stop → destroy
//! - silent no-ops outside the applicable states
//! - no emission after destroy, and a clean handover on re-init
//!
//! Run with: `cargo test --test bridge_integration`

use std::sync::{mpsc, Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::timeout;

use lbs_bridge::channel::HostEvent;
use lbs_bridge::engine::SimulatedEngineFactory;
use lbs_bridge::{
    CanonicalLocationEvent, LifecycleController, LifecycleState, LocationBridge, LOCATION_EVENT,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Interval at which the simulated engine replays its script.
const TICK: Duration = Duration::from_millis(5);

fn make_bridge() -> LocationBridge {
    let factory = SimulatedEngineFactory::with_demo_script().with_fixed_interval(TICK);
    LocationBridge::with_broadcast(Arc::new(factory), 256)
}

async fn next_event(rx: &mut broadcast::Receiver<HostEvent>) -> HostEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

/// Error codes of the next `n` events.
async fn next_codes(rx: &mut broadcast::Receiver<HostEvent>, n: usize) -> Vec<i32> {
    let mut codes = Vec::with_capacity(n);
    for _ in 0..n {
        codes.push(next_event(rx).await.payload.error_code);
    }
    codes
}

/// Discard everything already buffered.
fn drain(rx: &mut broadcast::Receiver<HostEvent>) {
    loop {
        match rx.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

/// Assert nothing arrives for a number of engine ticks.
async fn assert_quiet(rx: &mut broadcast::Receiver<HostEvent>) {
    tokio::time::sleep(TICK * 10).await;
    assert!(
        matches!(rx.try_recv(), Err(TryRecvError::Empty)),
        "unexpected event"
    );
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle() {
    let bridge = make_bridge();
    let mut rx = bridge.subscribe().unwrap();

    assert_eq!(bridge.init("demo-key").await, Ok(true));
    bridge.set_option(&json!({"coorType": "gcj02", "reGeocode": true}));
    bridge.start();
    assert_eq!(bridge.state(), LifecycleState::Started);

    let first = next_event(&mut rx).await;
    assert_eq!(first.name, LOCATION_EVENT);
    assert_eq!(first.payload.error_code, 0);

    let fix = first.payload.fix.as_ref().unwrap();
    assert_eq!(fix.loc_type, 161);
    assert_eq!(fix.coor_type, "gcj02");
    assert!(fix.timestamp > 0);
    assert_eq!(
        fix.address.as_ref().and_then(|a| a.city.as_deref()),
        Some("Beijing")
    );
    assert_eq!(fix.poi_list.as_ref().map(Vec::len), Some(2));

    // Script order: network fix, GNSS fix, failed fix.
    assert_eq!(next_codes(&mut rx, 2).await, vec![0, -1]);

    bridge.stop();
    assert_eq!(bridge.state(), LifecycleState::Initialized);
    drain(&mut rx);
    assert_quiet(&mut rx).await;

    bridge.destroy();
    assert_eq!(bridge.state(), LifecycleState::Destroyed);
}

#[tokio::test]
async fn test_event_payload_serializes_to_host_schema() {
    let bridge = make_bridge();
    let mut rx = bridge.subscribe().unwrap();
    bridge.init("demo-key").await.unwrap();
    bridge.start();

    let event = next_event(&mut rx).await;
    bridge.destroy();

    let value = serde_json::to_value(&event.payload).unwrap();
    assert_eq!(value["errorCode"], 0);
    assert_eq!(value["locType"], 161);
    assert_eq!(value["coorType"], "bd09ll");
    assert_eq!(value["poiList"][0]["name"], "Tiananmen");
    assert!(value.get("errorMessage").is_none());
}

#[tokio::test]
async fn test_re_geocode_off_omits_address() {
    let bridge = make_bridge();
    let mut rx = bridge.subscribe().unwrap();
    bridge.init("demo-key").await.unwrap();
    bridge.set_option(&json!({"reGeocode": false}));
    bridge.start();

    let event = next_event(&mut rx).await;
    bridge.destroy();

    let fix = event.payload.fix.unwrap();
    assert!(fix.address.is_none());
    assert!(fix.poi_list.is_none());
}

#[tokio::test]
async fn test_calls_before_init_are_silent() {
    let bridge = make_bridge();
    let mut rx = bridge.subscribe().unwrap();

    bridge.stop();
    bridge.destroy();
    bridge.start();
    bridge.set_option(&json!({"scanSpan": 5000}));

    assert_eq!(bridge.state(), LifecycleState::Uninitialized);
    assert_eq!(bridge.options().scan_interval_ms(), 1000);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn test_double_start_registers_one_sink() {
    let bridge = make_bridge();
    let mut rx = bridge.subscribe().unwrap();
    bridge.init("demo-key").await.unwrap();

    bridge.start();
    bridge.start();

    // A duplicated sink would emit every report twice.
    assert_eq!(next_codes(&mut rx, 6).await, vec![0, 0, -1, 0, 0, -1]);
    bridge.destroy();
}

#[tokio::test]
async fn test_no_events_after_destroy() {
    let bridge = make_bridge();
    let mut rx = bridge.subscribe().unwrap();
    bridge.init("demo-key").await.unwrap();
    bridge.start();
    next_event(&mut rx).await;

    bridge.destroy();
    drain(&mut rx);
    assert_quiet(&mut rx).await;

    // Destroyed is terminal.
    assert_eq!(bridge.init("demo-key").await, Ok(false));
    bridge.start();
    assert_eq!(bridge.state(), LifecycleState::Destroyed);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn test_reinit_replaces_engine() {
    let bridge = make_bridge();
    let mut rx = bridge.subscribe().unwrap();
    bridge.init("demo-key").await.unwrap();
    bridge.set_option(&json!({"coorType": "gcj02"}));
    bridge.start();
    next_event(&mut rx).await;

    assert_eq!(bridge.init("demo-key").await, Ok(true));
    assert_eq!(bridge.state(), LifecycleState::Initialized);
    assert_eq!(bridge.options().coordinate_system().as_str(), "bd09ll");
    drain(&mut rx);
    assert_quiet(&mut rx).await;

    // The fresh engine replays from the start of its script.
    bridge.start();
    let first = next_event(&mut rx).await;
    assert_eq!(first.payload.fix.map(|f| f.loc_type), Some(161));
    assert_eq!(next_codes(&mut rx, 2).await, vec![0, -1]);
    bridge.destroy();
}

#[tokio::test]
async fn test_failed_init_keeps_bridge_uninitialized() {
    let bridge = make_bridge();

    let err = bridge.init("  ").await.unwrap_err();
    assert_eq!(err.code(), "-1");
    assert_eq!(bridge.state(), LifecycleState::Uninitialized);

    assert_eq!(bridge.init("demo-key").await, Ok(true));
}

#[tokio::test]
async fn test_independent_bridges() {
    let a = make_bridge();
    let b = make_bridge();
    let mut rx_a = a.subscribe().unwrap();
    let mut rx_b = b.subscribe().unwrap();

    a.init("key-a").await.unwrap();
    b.init("key-b").await.unwrap();
    a.start();

    next_event(&mut rx_a).await;
    assert_quiet(&mut rx_b).await;

    a.destroy();
    assert_eq!(b.state(), LifecycleState::Initialized);
    b.destroy();
}

#[tokio::test]
async fn test_stats_track_emissions() {
    let bridge = make_bridge();
    let mut rx = bridge.subscribe().unwrap();
    bridge.init("demo-key").await.unwrap();
    bridge.start();
    next_codes(&mut rx, 3).await;
    bridge.destroy();

    let stats = bridge.stats();
    assert!(stats.emitted >= 3);
    assert_eq!(stats.normalization_failures, 0);
}

// ============================================================================
// Host reacting from inside the event channel
// ============================================================================

#[test]
fn test_channel_can_stop_controller_on_engine_thread() {
    let slot: Arc<Mutex<Weak<LifecycleController>>> = Arc::new(Mutex::new(Weak::new()));
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);

    let target = Arc::clone(&slot);
    let channel = move |_: &str, event: CanonicalLocationEvent| {
        // One-shot request: stop as soon as the first fix arrives.
        let controller = target.lock().upgrade();
        if let Some(controller) = controller {
            controller.stop();
        }
        let _ = tx.lock().send(event.error_code);
    };

    let factory = SimulatedEngineFactory::with_demo_script().with_fixed_interval(TICK);
    let controller = Arc::new(LifecycleController::new(Arc::new(factory), Arc::new(channel)));
    *slot.lock() = Arc::downgrade(&controller);

    controller.init("demo-key").unwrap();
    controller.start();

    let first = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("engine thread stuck inside the channel");
    assert_eq!(first, 0);
    assert_eq!(controller.state(), LifecycleState::Initialized);

    std::thread::sleep(TICK * 10);
    assert!(rx.try_recv().is_err(), "event emitted after stop");

    controller.destroy();
    assert_eq!(controller.state(), LifecycleState::Destroyed);
}
