//! Configuration file support.
//!
//! Settings live in an INI file, by default
//! `<config dir>/lbs-bridge/config.ini`:
//!
//! ```ini
//! [engine]
//! credential = <access key>
//!
//! [location]
//! location_mode = 0
//! scan_span = 3000
//! coor_type = gcj02
//! re_geocode = true
//!
//! [logging]
//! directory = logs
//! file = lbs-bridge.log
//! ```
//!
//! Every section and key is optional. The `[location]` section is read into an
//! [`OptionPatch`](crate::options::OptionPatch) that callers apply after
//! `init`.

mod file;
mod parser;

pub use file::{
    config_directory, config_file_path, ConfigFile, ConfigFileError, EngineSettings,
    LoggingSettings,
};
