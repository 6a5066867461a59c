//! Engine option types.

use std::fmt;

use serde::Serialize;

/// Minimum scan interval accepted by the engine, in milliseconds.
///
/// Patches must supply a value strictly greater than this to take effect.
pub const MIN_SCAN_INTERVAL_MS: u32 = 1000;

/// Positioning strategy requested from the engine.
///
/// The discriminants match the integer indices used by host callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationMode {
    /// GNSS plus network positioning.
    #[default]
    HighAccuracy = 0,
    /// Network positioning only.
    BatterySaving = 1,
    /// On-device sensors (GNSS) only.
    DeviceSensors = 2,
    /// Coarse, privacy-preserving positioning.
    Fuzzy = 3,
}

impl LocationMode {
    /// Ordered lookup table indexed by the host's integer mode.
    pub const ALL: [LocationMode; 4] = [
        LocationMode::HighAccuracy,
        LocationMode::BatterySaving,
        LocationMode::DeviceSensors,
        LocationMode::Fuzzy,
    ];

    /// Resolve a host-supplied index.
    ///
    /// Any index outside `0..=3` falls back to [`LocationMode::HighAccuracy`].
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// The host-facing integer index of this mode.
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Geodetic reference frame attached to reported coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum CoordinateSystem {
    /// China's national obfuscated datum.
    #[serde(rename = "gcj02")]
    Gcj02,
    /// Engine vendor datum layered over GCJ-02.
    #[default]
    #[serde(rename = "bd09ll")]
    Bd09ll,
}

impl CoordinateSystem {
    /// Resolve a coordinate-system tag.
    ///
    /// Only the exact, case-sensitive tag `"gcj02"` selects GCJ-02. Every
    /// other string resolves to BD-09.
    pub fn from_tag(tag: &str) -> Self {
        if tag == "gcj02" {
            CoordinateSystem::Gcj02
        } else {
            CoordinateSystem::Bd09ll
        }
    }

    /// The wire tag passed to the engine.
    pub fn as_str(self) -> &'static str {
        match self {
            CoordinateSystem::Gcj02 => "gcj02",
            CoordinateSystem::Bd09ll => "bd09ll",
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved option set handed to the positioning engine.
///
/// Values are only produced by [`EngineOptions::default`] and
/// [`build_options`](super::build_options), so the invariants on mode and
/// scan interval always hold. The altitude, device-direction and GNSS flags
/// are fixed and cannot be changed by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    pub(super) location_mode: LocationMode,
    pub(super) coordinate_system: CoordinateSystem,
    pub(super) scan_interval_ms: u32,
    pub(super) need_address: bool,
    pub(super) need_location_narrative: bool,
    pub(super) need_poi_list: bool,
    open_gnss: bool,
    need_altitude: bool,
    need_device_direction: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            location_mode: LocationMode::HighAccuracy,
            coordinate_system: CoordinateSystem::Bd09ll,
            scan_interval_ms: MIN_SCAN_INTERVAL_MS,
            need_address: true,
            need_location_narrative: true,
            need_poi_list: true,
            open_gnss: true,
            need_altitude: true,
            need_device_direction: true,
        }
    }
}

impl EngineOptions {
    pub fn location_mode(&self) -> LocationMode {
        self.location_mode
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Interval between periodic fixes, in milliseconds.
    pub fn scan_interval_ms(&self) -> u32 {
        self.scan_interval_ms
    }

    /// Whether reverse geocoding (address bundle) is requested.
    pub fn need_address(&self) -> bool {
        self.need_address
    }

    /// Whether a human-readable location narrative is requested.
    pub fn need_location_narrative(&self) -> bool {
        self.need_location_narrative
    }

    /// Whether nearby points of interest are requested.
    pub fn need_poi_list(&self) -> bool {
        self.need_poi_list
    }

    pub fn open_gnss(&self) -> bool {
        self.open_gnss
    }

    pub fn need_altitude(&self) -> bool {
        self.need_altitude
    }

    pub fn need_device_direction(&self) -> bool {
        self.need_device_direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_mode_from_index_in_range() {
        assert_eq!(LocationMode::from_index(0), LocationMode::HighAccuracy);
        assert_eq!(LocationMode::from_index(1), LocationMode::BatterySaving);
        assert_eq!(LocationMode::from_index(2), LocationMode::DeviceSensors);
        assert_eq!(LocationMode::from_index(3), LocationMode::Fuzzy);
    }

    #[test]
    fn test_location_mode_from_index_out_of_range() {
        assert_eq!(LocationMode::from_index(4), LocationMode::HighAccuracy);
        assert_eq!(LocationMode::from_index(5), LocationMode::HighAccuracy);
        assert_eq!(LocationMode::from_index(-1), LocationMode::HighAccuracy);
        assert_eq!(LocationMode::from_index(i64::MAX), LocationMode::HighAccuracy);
    }

    #[test]
    fn test_location_mode_index_round_trip() {
        for mode in LocationMode::ALL {
            assert_eq!(LocationMode::from_index(mode.index() as i64), mode);
        }
    }

    #[test]
    fn test_coordinate_system_is_case_sensitive() {
        assert_eq!(CoordinateSystem::from_tag("gcj02"), CoordinateSystem::Gcj02);
        assert_eq!(CoordinateSystem::from_tag("GCJ02"), CoordinateSystem::Bd09ll);
        assert_eq!(CoordinateSystem::from_tag("foo"), CoordinateSystem::Bd09ll);
        assert_eq!(CoordinateSystem::from_tag(""), CoordinateSystem::Bd09ll);
    }

    #[test]
    fn test_default_options() {
        let options = EngineOptions::default();
        assert_eq!(options.location_mode(), LocationMode::HighAccuracy);
        assert_eq!(options.coordinate_system(), CoordinateSystem::Bd09ll);
        assert_eq!(options.scan_interval_ms(), 1000);
        assert!(options.open_gnss());
        assert!(options.need_altitude());
        assert!(options.need_device_direction());
        assert!(options.need_address());
        assert!(options.need_location_narrative());
        assert!(options.need_poi_list());
    }

    #[test]
    fn test_options_serialize_with_wire_tags() {
        let json = serde_json::to_value(EngineOptions::default()).unwrap();
        assert_eq!(json["coordinateSystem"], "bd09ll");
        assert_eq!(json["locationMode"], "highAccuracy");
        assert_eq!(json["scanIntervalMs"], 1000);
    }
}
