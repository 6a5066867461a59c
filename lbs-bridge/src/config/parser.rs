//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;

use ini::Ini;

use super::file::{ConfigFile, ConfigFileError};
use crate::options::CoordinateSystem;

/// Parse an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [engine] section
    if let Some(section) = ini.section(Some("engine")) {
        if let Some(v) = section.get("credential") {
            let v = v.trim();
            if !v.is_empty() {
                config.engine.credential = Some(v.to_string());
            }
        }
    }

    // [location] section
    if let Some(section) = ini.section(Some("location")) {
        if let Some(v) = section.get("location_mode") {
            config.location.location_mode = Some(parse_integer(
                "location",
                "location_mode",
                v,
                "must be an integer (0-3)",
            )?);
        }
        if let Some(v) = section.get("scan_span") {
            config.location.scan_span = Some(parse_integer(
                "location",
                "scan_span",
                v,
                "must be an integer (milliseconds)",
            )?);
        }
        if let Some(v) = section.get("coor_type") {
            let v = v.trim();
            config.location.coordinate_system = Some(match v {
                "gcj02" => CoordinateSystem::Gcj02,
                "bd09ll" => CoordinateSystem::Bd09ll,
                _ => return Err(invalid("location", "coor_type", v, "must be 'gcj02' or 'bd09ll'")),
            });
        }
        if let Some(v) = section.get("re_geocode") {
            config.location.re_geocode = Some(parse_bool(v).ok_or_else(|| {
                invalid("location", "re_geocode", v, "must be true or false")
            })?);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_integer(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<i64, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

/// Strict boolean: `true/1/yes/on` or `false/0/no/off`, case-insensitive.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
