//! Simulate command - run a bridge over the scripted engine and print events.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lbs_bridge::config::ConfigFile;
use lbs_bridge::engine::{demo_script, SimulatedEngineFactory};
use lbs_bridge::LocationBridge;
use tokio::sync::{broadcast, Notify};
use tracing::info;

use super::reports::read_reports;
use crate::error::CliError;

/// Broadcast buffer between the engine thread and the printer.
const EVENT_BUFFER: usize = 64;

/// Arguments for the simulate command.
pub struct SimulateArgs {
    /// Raw reports to replay instead of the built-in demo script.
    pub reports: Option<PathBuf>,
    /// Stop after this many events.
    pub count: Option<usize>,
    /// Overrides the credential from the config file.
    pub credential: Option<String>,
    /// Replay at a fixed interval instead of the configured scan span.
    pub interval_ms: Option<u64>,
}

/// Run the simulate command.
pub fn run(args: SimulateArgs, config: &ConfigFile) -> Result<(), CliError> {
    let script = match &args.reports {
        Some(path) => read_reports(path)?,
        None => demo_script(),
    };
    if script.is_empty() {
        return Err(CliError::Config("report file contains no reports".to_string()));
    }

    let credential = args
        .credential
        .clone()
        .or_else(|| config.engine.credential.clone())
        .ok_or_else(|| CliError::Config("no access credential configured".to_string()))?;

    let mut factory = SimulatedEngineFactory::new(script);
    if let Some(ms) = args.interval_ms {
        factory = factory.with_fixed_interval(Duration::from_millis(ms));
    }
    let bridge = LocationBridge::with_broadcast(Arc::new(factory), EVENT_BUFFER);

    let shutdown = Arc::new(Notify::new());
    let shutdown_handler = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        shutdown_handler.notify_one();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let result = runtime.block_on(simulate(&bridge, &credential, config, args.count, &shutdown));

    bridge.destroy();
    let stats = bridge.stats();
    info!(
        emitted = stats.emitted,
        dropped = stats.dropped,
        normalization_failures = stats.normalization_failures,
        "Simulation finished"
    );
    result
}

async fn simulate(
    bridge: &LocationBridge,
    credential: &str,
    config: &ConfigFile,
    count: Option<usize>,
    shutdown: &Notify,
) -> Result<(), CliError> {
    let Some(mut events) = bridge.subscribe() else {
        return Err(CliError::Config("bridge has no event subscription".to_string()));
    };

    bridge.init(credential).await?;
    if !config.location.is_empty() {
        bridge.set_option_patch(&config.location);
    }
    info!(options = ?bridge.options(), "Starting simulated engine");
    bridge.start();

    let mut printed = 0usize;
    while count.map_or(true, |limit| printed < limit) {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("Interrupted");
                break;
            }
            received = events.recv() => match received {
                Ok(event) => {
                    match serde_json::to_string(&event.payload) {
                        Ok(json) => println!("{}", json),
                        Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
                    }
                    printed += 1;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    bridge.stop();
    Ok(())
}
