//! Option mapping for the positioning engine.
//!
//! Turns a partial, loosely-typed host configuration into a complete
//! [`EngineOptions`]. Mapping is fail-open: malformed input degrades to safe
//! defaults rather than producing an error.
//!
//! # Rules
//!
//! ```text
//! locationMode   0..=3 → table lookup, anything else → HighAccuracy
//! scanSpan       > 1000 → applied, otherwise baseline kept
//! coorType       "gcj02" → GCJ-02, any other value (or absent) → BD-09
//! reGeocode      → needAddress + needLocationNarrative + needPoiList
//! ```
//!
//! # Example
//!
//! ```
//! use lbs_bridge::options::{build_options, EngineOptions, LocationMode, OptionPatch};
//!
//! let patch = OptionPatch::new().with_location_mode_index(5).with_scan_span(500);
//! let options = build_options(&EngineOptions::default(), &patch);
//!
//! assert_eq!(options.location_mode(), LocationMode::HighAccuracy);
//! assert_eq!(options.scan_interval_ms(), 1000);
//! ```

mod patch;
mod types;

pub use patch::{OptionPatch, KEY_COOR_TYPE, KEY_LOCATION_MODE, KEY_RE_GEOCODE, KEY_SCAN_SPAN};
pub use types::{CoordinateSystem, EngineOptions, LocationMode, MIN_SCAN_INTERVAL_MS};

/// Apply `patch` on top of `existing`.
///
/// Pure and total. Fields absent from the patch keep their baseline value,
/// except the coordinate system, which falls back to BD-09 whenever the patch
/// does not name GCJ-02. Applying the same patch twice gives the same result
/// as applying it once.
pub fn build_options(existing: &EngineOptions, patch: &OptionPatch) -> EngineOptions {
    let mut options = existing.clone();

    if let Some(index) = patch.location_mode {
        options.location_mode = LocationMode::from_index(index);
    }

    if let Some(span) = patch
        .scan_span
        .and_then(|span| u32::try_from(span).ok())
        .filter(|span| *span > MIN_SCAN_INTERVAL_MS)
    {
        options.scan_interval_ms = span;
    }

    options.coordinate_system = patch.coordinate_system.unwrap_or(CoordinateSystem::Bd09ll);

    if let Some(enabled) = patch.re_geocode {
        options.need_address = enabled;
        options.need_location_narrative = enabled;
        options.need_poi_list = enabled;
    }

    options
}
