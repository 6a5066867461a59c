//! The canonical location event emitted to the host.

use serde::Serialize;

/// `errorCode` for a GNSS or network fix.
pub const ERROR_CODE_SUCCESS: i32 = 0;
/// `errorCode` when the engine reported a non-success status.
pub const ERROR_CODE_FIX_FAILED: i32 = -1;
/// `errorCode` when the raw report could not be normalized.
pub const ERROR_CODE_NORMALIZATION_FAILED: i32 = -2;

/// One normalized location callback.
///
/// Serializes to the host schema: `errorCode` is always present, the fix
/// fields are present unless normalization failed, and `errorMessage` is
/// present only when it did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalLocationEvent {
    pub error_code: i32,
    #[serde(flatten)]
    pub fix: Option<FixDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Fields carried by every successfully normalized event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixDetails {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub direction: f64,
    pub radius: f64,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub loc_type: i32,
    pub loc_type_description: String,
    pub coor_type: String,
    pub mock_gnss_probability: i32,
    pub gnss_provider: String,
    #[serde(flatten)]
    pub address: Option<AddressFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poi_list: Option<Vec<PoiEntry>>,
}

/// Address fields, flattened into the event when the report carried them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
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
    pub address: Option<String>,
    pub location_describe: Option<String>,
}

/// A point of interest in the emitted `poiList`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoiEntry {
    pub id: String,
    pub rank: f64,
    pub name: String,
    pub tags: String,
    pub addr: String,
}

impl CanonicalLocationEvent {
    /// Minimal event for a report that could not be normalized.
    pub fn normalization_failure(message: impl Into<String>) -> Self {
        Self {
            error_code: ERROR_CODE_NORMALIZATION_FAILED,
            fix: None,
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code == ERROR_CODE_SUCCESS
    }

    /// Coordinates of the fix, if normalization succeeded.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.fix.as_ref().map(|f| (f.latitude, f.longitude))
    }
}
