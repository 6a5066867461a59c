//! In-process engine that replays a script of raw reports.
//!
//! Each started engine owns one worker thread. The worker waits one scan
//! interval, hands the next scripted report to every registered sink, and
//! loops until stopped. `stop()` only flips a flag and wakes the worker; it
//! never joins, so a delivery in progress finishes on its own.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::{EngineError, EngineFactory, LocationEngine, LocationSink};
use crate::event::{RawAddress, RawLocationReport, RawPoi};
use crate::options::EngineOptions;

/// Factory for [`SimulatedEngine`] handles.
pub struct SimulatedEngineFactory {
    script: Arc<Vec<RawLocationReport>>,
    fixed_interval: Option<Duration>,
    credential: Mutex<Option<String>>,
    privacy_agreed: Mutex<bool>,
}

impl SimulatedEngineFactory {
    /// Replay `script` in order, wrapping around at the end.
    pub fn new(script: Vec<RawLocationReport>) -> Self {
        Self {
            script: Arc::new(script),
            fixed_interval: None,
            credential: Mutex::new(None),
            privacy_agreed: Mutex::new(false),
        }
    }

    /// Factory replaying [`demo_script`].
    pub fn with_demo_script() -> Self {
        Self::new(demo_script())
    }

    /// Deliver at `interval` regardless of the configured scan interval.
    pub fn with_fixed_interval(mut self, interval: Duration) -> Self {
        self.fixed_interval = Some(interval);
        self
    }

    /// The credential last accepted by [`EngineFactory::set_credential`].
    pub fn credential(&self) -> Option<String> {
        self.credential.lock().clone()
    }

    pub fn privacy_agreed(&self) -> bool {
        *self.privacy_agreed.lock()
    }
}

impl EngineFactory for SimulatedEngineFactory {
    fn agree_privacy(&self, agreed: bool) {
        *self.privacy_agreed.lock() = agreed;
    }

    fn set_credential(&self, credential: &str) -> Result<(), EngineError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(EngineError::InvalidCredential(
                "credential must not be empty".to_string(),
            ));
        }
        *self.credential.lock() = Some(credential.to_string());
        Ok(())
    }

    fn create(&self) -> Result<Box<dyn LocationEngine>, EngineError> {
        if !self.privacy_agreed() {
            return Err(EngineError::Construction(
                "privacy policy has not been agreed".to_string(),
            ));
        }
        if self.credential().is_none() {
            return Err(EngineError::Construction("no credential set".to_string()));
        }
        Ok(Box::new(SimulatedEngine::new(
            Arc::clone(&self.script),
            self.fixed_interval,
        )))
    }
}

#[derive(Debug, Default)]
struct RunState {
    running: bool,
    /// Bumped on every start so a stale worker notices it was superseded.
    epoch: u64,
}

struct Shared {
    run: Mutex<RunState>,
    wake: Condvar,
    sinks: Mutex<Vec<Arc<dyn LocationSink>>>,
    options: Mutex<EngineOptions>,
    script: Arc<Vec<RawLocationReport>>,
    fixed_interval: Option<Duration>,
}

/// A scripted engine handle.
pub struct SimulatedEngine {
    shared: Arc<Shared>,
}

impl SimulatedEngine {
    fn new(script: Arc<Vec<RawLocationReport>>, fixed_interval: Option<Duration>) -> Self {
        Self {
            shared: Arc::new(Shared {
                run: Mutex::new(RunState::default()),
                wake: Condvar::new(),
                sinks: Mutex::new(Vec::new()),
                options: Mutex::new(EngineOptions::default()),
                script,
                fixed_interval,
            }),
        }
    }

    /// Number of currently registered sinks.
    pub fn sink_count(&self) -> usize {
        self.shared.sinks.lock().len()
    }

    /// The option set last applied with `configure`.
    pub fn options(&self) -> EngineOptions {
        self.shared.options.lock().clone()
    }
}

impl Shared {
    fn interval(&self) -> Duration {
        self.fixed_interval.unwrap_or_else(|| {
            Duration::from_millis(u64::from(self.options.lock().scan_interval_ms()))
        })
    }

    /// Wait one interval. Returns false once the worker for `epoch` should exit.
    fn wait_tick(&self, epoch: u64) -> bool {
        let deadline = Instant::now() + self.interval();
        let mut run = self.run.lock();
        while run.running && run.epoch == epoch {
            if self.wake.wait_until(&mut run, deadline).timed_out() {
                break;
            }
        }
        run.running && run.epoch == epoch
    }

    /// Strip what the current options did not ask for and stamp the
    /// configured coordinate system.
    fn shape(&self, scripted: &RawLocationReport) -> RawLocationReport {
        let options = self.options.lock().clone();
        let mut report = scripted.clone();
        if !options.need_address() {
            report.has_addr = false;
            report.address = RawAddress::default();
        }
        if !options.need_poi_list() {
            report.poi_list = None;
        }
        if report.coor_type.is_some() {
            report.coor_type = Some(options.coordinate_system().as_str().to_string());
        }
        report
    }

    fn run_worker(&self, epoch: u64) {
        tracing::debug!(epoch, "Simulated engine worker started");

        let mut cursor = 0usize;
        while !self.script.is_empty() && self.wait_tick(epoch) {
            let report = self.shape(&self.script[cursor % self.script.len()]);
            cursor = cursor.wrapping_add(1);

            // Deliver outside the sink lock so sinks may (un)register freely.
            let sinks: Vec<_> = self.sinks.lock().clone();
            for sink in sinks {
                sink.on_receive_location(&report);
            }
        }

        tracing::debug!(epoch, "Simulated engine worker stopped");
    }
}

impl LocationEngine for SimulatedEngine {
    fn configure(&self, options: &EngineOptions) {
        *self.shared.options.lock() = options.clone();
        self.shared.wake.notify_all();
    }

    fn register_callback(&self, sink: Arc<dyn LocationSink>) {
        let mut sinks = self.shared.sinks.lock();
        if !sinks.iter().any(|s| Arc::ptr_eq(s, &sink)) {
            sinks.push(sink);
        }
    }

    fn unregister_callback(&self, sink: &Arc<dyn LocationSink>) {
        self.shared.sinks.lock().retain(|s| !Arc::ptr_eq(s, sink));
    }

    fn start(&self) {
        let epoch = {
            let mut run = self.shared.run.lock();
            if run.running {
                return;
            }
            run.running = true;
            run.epoch += 1;
            run.epoch
        };

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("simulated-engine".to_string())
            .spawn(move || shared.run_worker(epoch));

        if let Err(e) = spawned {
            tracing::error!(error = %e, "Failed to spawn simulated engine worker");
            self.shared.run.lock().running = false;
        }
    }

    fn stop(&self) {
        self.shared.run.lock().running = false;
        self.shared.wake.notify_all();
    }

    fn is_started(&self) -> bool {
        self.shared.run.lock().running
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A short loop of reports around central Beijing.
///
/// Covers a network fix with address and POIs, a GNSS fix without address,
/// and a failed fix that still carries coarse coordinates.
pub fn demo_script() -> Vec<RawLocationReport> {
    let address = RawAddress {
        country: Some("China".to_string()),
        country_code: Some("0".to_string()),
        province: Some("Beijing".to_string()),
        city: Some("Beijing".to_string()),
        city_code: Some("131".to_string()),
        district: Some("Dongcheng".to_string()),
        town: Some("Donghuamen".to_string()),
        street: Some("East Chang'an Avenue".to_string()),
        street_number: Some("1".to_string()),
        adcode: Some("110101".to_string()),
        addr_str: Some("1 East Chang'an Avenue, Dongcheng, Beijing, China".to_string()),
        location_describe: Some("near Tiananmen".to_string()),
    };

    let network_fix = RawLocationReport {
        altitude: Some(44.0),
        radius: Some(40.0),
        time: Some("2024-05-01 09:30:00".to_string()),
        has_addr: true,
        address,
        loc_type_description: Some("NetWork location successful!".to_string()),
        coor_type: Some("bd09ll".to_string()),
        poi_list: Some(vec![
            RawPoi {
                id: "17301920139385622527".to_string(),
                rank: 1.0,
                name: "Tiananmen".to_string(),
                tags: "tourism;landmark".to_string(),
                addr: "East Chang'an Avenue".to_string(),
            },
            RawPoi {
                id: "8815402376201543679".to_string(),
                rank: 0.7,
                name: "Palace Museum".to_string(),
                tags: "tourism;museum".to_string(),
                addr: "4 Jingshan Front Street".to_string(),
            },
        ]),
        ..RawLocationReport::fix(161, 39.915_119, 116.403_963)
    };

    let gnss_fix = RawLocationReport {
        altitude: Some(46.5),
        speed: Some(4.2),
        direction: Some(87.0),
        radius: Some(8.0),
        time: Some("2024-05-01 09:30:03".to_string()),
        loc_type_description: Some("GPS location successful!".to_string()),
        coor_type: Some("bd09ll".to_string()),
        mock_gnss_probability: Some(0),
        gnss_provider: Some("gps".to_string()),
        ..RawLocationReport::fix(61, 39.915_402, 116.404_511)
    };

    let failed_fix = RawLocationReport {
        time: Some("2024-05-01 09:30:06".to_string()),
        loc_type_description: Some("NetWork location failed because of network".to_string()),
        coor_type: Some("bd09ll".to_string()),
        ..RawLocationReport::fix(63, 39.91, 116.40)
    };

    vec![network_fix, gnss_fix, failed_fix]
}
