//! LBS Bridge CLI - Command-line harness
//!
//! Exercises the bridge library from a terminal: geodesic distances, report
//! normalization, and a full lifecycle over the simulated engine.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lbs_bridge::config::ConfigFile;
use lbs_bridge::logging::init_logging;

use commands::distance::DistanceArgs;
use commands::normalize::NormalizeArgs;
use commands::simulate::SimulateArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "lbs-bridge")]
#[command(version, about = "Location engine bridge harness", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/lbs-bridge/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mirror log output to stdout
    #[arg(long, global = true)]
    log_stdout: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the distance in meters between two points
    #[command(allow_negative_numbers = true)]
    Distance {
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    },

    /// Normalize raw location reports from a JSON file
    Normalize {
        /// File holding one report object or an array of them
        file: PathBuf,

        /// Pretty-print each event
        #[arg(long)]
        pretty: bool,
    },

    /// Run a bridge over the simulated engine and print each event
    Simulate {
        /// Replay reports from this JSON file instead of the demo script
        #[arg(long)]
        reports: Option<PathBuf>,

        /// Stop after this many events (default: run until Ctrl-C)
        #[arg(long)]
        count: Option<usize>,

        /// Access credential (overrides the config file)
        #[arg(long)]
        credential: Option<String>,

        /// Replay interval in milliseconds (default: the configured scan span)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            commands::distance::run(DistanceArgs {
                lat1,
                lon1,
                lat2,
                lon2,
            });
            Ok(())
        }
        Commands::Normalize { file, pretty } => {
            commands::normalize::run(NormalizeArgs { file, pretty })
        }
        Commands::Simulate {
            reports,
            count,
            credential,
            interval_ms,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let _logging_guard = init_logging(
                &config.logging.directory,
                &config.logging.file,
                cli.log_stdout,
            )
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

            commands::simulate::run(
                SimulateArgs {
                    reports,
                    count,
                    credential,
                    interval_ms,
                },
                &config,
            )
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}
