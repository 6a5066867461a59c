//! Raw location reports as delivered by the positioning engine.
//!
//! Every field is optional on the wire. Engines fill in what they know; the
//! normalizer decides what is required.

use serde::Deserialize;

/// Engine status code for a satellite (GNSS) fix.
pub const LOC_TYPE_GNSS: i32 = 61;
/// Engine status code for a network fix.
pub const LOC_TYPE_NETWORK: i32 = 161;

/// An unprocessed position fix.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLocationReport {
    /// Engine status code (`61` GNSS, `161` network, anything else is a failure).
    pub loc_type: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    /// Ground speed as reported by the engine.
    pub speed: Option<f64>,
    /// Bearing in degrees.
    pub direction: Option<f64>,
    /// Accuracy radius in meters.
    pub radius: Option<f64>,
    /// Local date-time of the fix, formatted `yyyy-MM-dd HH:mm:ss`.
    pub time: Option<String>,
    /// Whether the address bundle carries data.
    pub has_addr: bool,
    pub address: RawAddress,
    pub loc_type_description: Option<String>,
    pub coor_type: Option<String>,
    pub mock_gnss_probability: Option<i32>,
    pub gnss_provider: Option<String>,
    /// Nearby points of interest, when the engine resolved any.
    pub poi_list: Option<Vec<RawPoi>>,
}

/// Reverse-geocoded address bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAddress {
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub city_code: Option<String>,
    pub district: Option<String>,
    pub town: Option<String>,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub adcode: Option<String>,
    /// Single-line formatted address.
    pub addr_str: Option<String>,
    /// Human-readable narrative ("near the east gate of ...").
    pub location_describe: Option<String>,
}

/// A point of interest near the fix.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPoi {
    pub id: String,
    pub rank: f64,
    pub name: String,
    pub tags: String,
    pub addr: String,
}

impl RawLocationReport {
    /// Report with a status code and coordinates, everything else unset.
    pub fn fix(loc_type: i32, latitude: f64, longitude: f64) -> Self {
        Self {
            loc_type: Some(loc_type),
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Default::default()
        }
    }

    /// True when the status code denotes a GNSS or network fix.
    pub fn is_success(&self) -> bool {
        matches!(self.loc_type, Some(LOC_TYPE_GNSS | LOC_TYPE_NETWORK))
    }
}
