//! Partial option updates supplied by the host.
//!
//! Host callers pass a loosely-typed map. [`OptionPatch::from_value`] reads it
//! permissively: a wrong-typed field never fails the call, it either degrades
//! to the field's fail-safe value or is ignored.

use serde_json::{Map, Value};

use super::types::{CoordinateSystem, LocationMode};

/// Host key for the location mode index.
pub const KEY_LOCATION_MODE: &str = "locationMode";
/// Host key for the scan interval.
pub const KEY_SCAN_SPAN: &str = "scanSpan";
/// Host key for the coordinate-system tag.
pub const KEY_COOR_TYPE: &str = "coorType";
/// Host key for the reverse-geocoding switch.
pub const KEY_RE_GEOCODE: &str = "reGeocode";

/// Alternative spellings accepted for the scan interval and coordinate system.
const ALIAS_SCAN_INTERVAL: &str = "scanIntervalMs";
const ALIAS_COORDINATE_SYSTEM: &str = "coordinateSystem";

/// A partial configuration. Every field is optional.
///
/// Values are stored as the host supplied them. Range checks (mode index,
/// minimum interval) happen in [`build_options`](super::build_options) so that
/// an ignored value leaves the baseline untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionPatch {
    /// Raw location mode index.
    pub location_mode: Option<i64>,
    /// Raw scan interval in milliseconds.
    pub scan_span: Option<i64>,
    /// Already-resolved coordinate system.
    pub coordinate_system: Option<CoordinateSystem>,
    /// Reverse-geocoding switch (address, narrative and POI list together).
    pub re_geocode: Option<bool>,
}

impl OptionPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location_mode(mut self, mode: LocationMode) -> Self {
        self.location_mode = Some(mode.index() as i64);
        self
    }

    /// Set the raw mode index (out-of-range values resolve to high accuracy).
    pub fn with_location_mode_index(mut self, index: i64) -> Self {
        self.location_mode = Some(index);
        self
    }

    pub fn with_scan_span(mut self, millis: i64) -> Self {
        self.scan_span = Some(millis);
        self
    }

    pub fn with_coordinate_system(mut self, system: CoordinateSystem) -> Self {
        self.coordinate_system = Some(system);
        self
    }

    /// Set the coordinate system from a host tag.
    pub fn with_coor_type(mut self, tag: &str) -> Self {
        self.coordinate_system = Some(CoordinateSystem::from_tag(tag));
        self
    }

    pub fn with_re_geocode(mut self, enabled: bool) -> Self {
        self.re_geocode = Some(enabled);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Read a patch from the host's loosely-typed option map.
    ///
    /// Never fails. Non-object input yields an empty patch.
    ///
    /// | key | present but malformed |
    /// |-----|-----------------------|
    /// | `locationMode` | high accuracy |
    /// | `scanSpan` / `scanIntervalMs` | ignored |
    /// | `coorType` / `coordinateSystem` | `bd09ll` |
    /// | `reGeocode` | ignored |
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let location_mode = map
            .get(KEY_LOCATION_MODE)
            .map(|v| integer_of(v).unwrap_or(0));

        let scan_span = lookup(map, KEY_SCAN_SPAN, ALIAS_SCAN_INTERVAL).and_then(integer_of);

        let coordinate_system = lookup(map, KEY_COOR_TYPE, ALIAS_COORDINATE_SYSTEM)
            .map(|v| CoordinateSystem::from_tag(v.as_str().unwrap_or_default()));

        let re_geocode = map.get(KEY_RE_GEOCODE).and_then(Value::as_bool);

        Self {
            location_mode,
            scan_span,
            coordinate_system,
            re_geocode,
        }
    }
}

/// Look up a key, falling back to its alias.
fn lookup<'a>(map: &'a Map<String, Value>, key: &str, alias: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| map.get(alias))
}

/// Integer view of a JSON number. Fractional numbers truncate toward zero.
fn integer_of(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}
