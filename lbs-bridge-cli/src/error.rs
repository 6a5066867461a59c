//! CLI error handling with user-friendly messages.
//!
//! Centralizes error reporting for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use lbs_bridge::config::ConfigFileError;
use lbs_bridge::BridgeError;

/// Exit code for bad input or configuration.
const EXIT_USAGE: i32 = 2;
/// Exit code for everything else.
const EXIT_FAILURE: i32 = 1;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be loaded
    ConfigFile(ConfigFileError),
    /// Failed to read an input file
    FileRead { path: PathBuf, error: std::io::Error },
    /// Input file is not a valid location report
    InvalidReport {
        path: PathBuf,
        error: serde_json::Error,
    },
    /// A bridge call was rejected
    Bridge(BridgeError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) | CliError::InvalidReport { .. } => {
                EXIT_USAGE
            }
            _ => EXIT_FAILURE,
        }
    }

    /// Exit the process with an error message and the matching code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) | CliError::Bridge(BridgeError::Initialization(_)) => {
                eprintln!();
                eprintln!("Set the access credential with --credential or in the");
                eprintln!("[engine] section of {}", lbs_bridge::config::config_file_path().display());
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read '{}': {}", path.display(), error)
            }
            CliError::InvalidReport { path, error } => {
                write!(f, "Invalid location report in '{}': {}", path.display(), error)
            }
            CliError::Bridge(e) => write!(f, "{} (code {})", e, e.code()),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::InvalidReport { error, .. } => Some(error),
            CliError::Bridge(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<BridgeError> for CliError {
    fn from(e: BridgeError) -> Self {
        CliError::Bridge(e)
    }
}
