//! Raw report → canonical event.

use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use super::canonical::{
    AddressFields, CanonicalLocationEvent, FixDetails, PoiEntry, ERROR_CODE_FIX_FAILED,
    ERROR_CODE_SUCCESS,
};
use super::report::{RawAddress, RawLocationReport, RawPoi};

/// Format of the engine's `time` field.
pub const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Why a raw report could not be normalized.
///
/// Never leaves this module as an error; it becomes the `errorMessage` of an
/// `errorCode = -2` event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("Malformed location report: missing field `{0}`")]
    MissingField(&'static str),

    #[error("Malformed location report: field `{field}` is not finite ({value})")]
    NonFinite { field: &'static str, value: f64 },
}

/// Normalize a report using the device's local time zone and wall clock.
pub fn normalize(raw: &RawLocationReport) -> CanonicalLocationEvent {
    normalize_with(raw, &Local, Utc::now().timestamp_millis())
}

/// Normalize a report, interpreting its `time` in `tz`.
///
/// `now_millis` is substituted when the timestamp cannot be parsed. Always
/// returns exactly one event.
pub fn normalize_with<Tz: TimeZone>(
    raw: &RawLocationReport,
    tz: &Tz,
    now_millis: i64,
) -> CanonicalLocationEvent {
    match try_normalize(raw, tz, now_millis) {
        Ok(event) => event,
        Err(e) => CanonicalLocationEvent::normalization_failure(e.to_string()),
    }
}

fn try_normalize<Tz: TimeZone>(
    raw: &RawLocationReport,
    tz: &Tz,
    now_millis: i64,
) -> Result<CanonicalLocationEvent, NormalizeError> {
    let loc_type = raw.loc_type.ok_or(NormalizeError::MissingField("locType"))?;
    let error_code = if raw.is_success() {
        ERROR_CODE_SUCCESS
    } else {
        ERROR_CODE_FIX_FAILED
    };

    let latitude = finite("latitude", raw.latitude.unwrap_or_default())?;
    let longitude = finite("longitude", raw.longitude.unwrap_or_default())?;

    let timestamp = raw
        .time
        .as_deref()
        .and_then(|time| parse_report_time(time, tz))
        .unwrap_or(now_millis);

    let address = raw.has_addr.then(|| address_fields(&raw.address));

    let poi_list = raw
        .poi_list
        .as_ref()
        .map(|pois| pois.iter().map(poi_entry).collect::<Result<Vec<_>, _>>())
        .transpose()?;

    let fix = FixDetails {
        latitude,
        longitude,
        altitude: finite("altitude", raw.altitude.unwrap_or_default())?,
        speed: finite("speed", raw.speed.unwrap_or_default())?,
        direction: finite("direction", raw.direction.unwrap_or_default())?,
        radius: finite("radius", raw.radius.unwrap_or_default())?,
        timestamp,
        loc_type,
        loc_type_description: raw.loc_type_description.clone().unwrap_or_default(),
        coor_type: raw.coor_type.clone().unwrap_or_default(),
        mock_gnss_probability: raw.mock_gnss_probability.unwrap_or_default(),
        gnss_provider: raw.gnss_provider.clone().unwrap_or_default(),
        address,
        poi_list,
    };

    Ok(CanonicalLocationEvent {
        error_code,
        fix: Some(fix),
        error_message: None,
    })
}

/// Parse an engine timestamp (`yyyy-MM-dd HH:mm:ss`) to epoch milliseconds.
///
/// Returns `None` for unparseable strings and for local times that do not
/// exist in `tz` (DST gaps). Ambiguous times resolve to the earlier instant.
pub fn parse_report_time<Tz: TimeZone>(time: &str, tz: &Tz) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(time.trim(), REPORT_TIME_FORMAT).ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

fn finite(field: &'static str, value: f64) -> Result<f64, NormalizeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NormalizeError::NonFinite { field, value })
    }
}

fn address_fields(raw: &RawAddress) -> AddressFields {
    AddressFields {
        country: raw.country.clone(),
        country_code: raw.country_code.clone(),
        province: raw.province.clone(),
        city: raw.city.clone(),
        city_code: raw.city_code.clone(),
        district: raw.district.clone(),
        town: raw.town.clone(),
        street: raw.street.clone(),
        street_number: raw.street_number.clone(),
        adcode: raw.adcode.clone(),
        address: raw.addr_str.clone(),
        location_describe: raw.location_describe.clone(),
    }
}

fn poi_entry(poi: &RawPoi) -> Result<PoiEntry, NormalizeError> {
    Ok(PoiEntry {
        id: poi.id.clone(),
        rank: finite("poiList.rank", poi.rank)?,
        name: poi.name.clone(),
        tags: poi.tags.clone(),
        addr: poi.addr.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::canonical::ERROR_CODE_NORMALIZATION_FAILED;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    const NOW: i64 = 1_234_567_890_000;

    fn china() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn run(raw: &RawLocationReport) -> CanonicalLocationEvent {
        normalize_with(raw, &china(), NOW)
    }

    fn full_report() -> RawLocationReport {
        RawLocationReport {
            loc_type: Some(161),
            latitude: Some(39.915),
            longitude: Some(116.404),
            altitude: Some(44.5),
            speed: Some(3.2),
            direction: Some(270.0),
            radius: Some(25.0),
            time: Some("2024-03-01 12:00:00".to_string()),
            has_addr: true,
            address: RawAddress {
                country: Some("China".to_string()),
                city: Some("Beijing".to_string()),
                addr_str: Some("Dongcheng, Beijing".to_string()),
                ..Default::default()
            },
            loc_type_description: Some("NetWork location successful!".to_string()),
            coor_type: Some("bd09ll".to_string()),
            mock_gnss_probability: Some(0),
            gnss_provider: Some("gps".to_string()),
            poi_list: Some(vec![RawPoi {
                id: "poi-1".to_string(),
                rank: 0.8,
                name: "Tiananmen".to_string(),
                tags: "tourism".to_string(),
                addr: "Chang'an Ave".to_string(),
            }]),
        }
    }

    #[test]
    fn test_success_codes() {
        assert_eq!(run(&RawLocationReport::fix(61, 1.0, 2.0)).error_code, 0);
        assert_eq!(run(&RawLocationReport::fix(161, 1.0, 2.0)).error_code, 0);
    }

    #[test]
    fn test_failure_code_still_populates_fields() {
        let mut raw = full_report();
        raw.loc_type = Some(167);

        let event = run(&raw);
        assert_eq!(event.error_code, ERROR_CODE_FIX_FAILED);

        let fix = event.fix.expect("fix fields present on -1");
        assert_eq!(fix.loc_type, 167);
        assert_eq!(fix.latitude, 39.915);
        assert!(fix.address.is_some());
        assert_eq!(fix.poi_list.map(|p| p.len()), Some(1));
    }

    #[test]
    fn test_full_report_maps_every_field() {
        let event = run(&full_report());
        let fix = event.fix.unwrap();

        assert_eq!(fix.altitude, 44.5);
        assert_eq!(fix.speed, 3.2);
        assert_eq!(fix.direction, 270.0);
        assert_eq!(fix.radius, 25.0);
        assert_eq!(fix.loc_type_description, "NetWork location successful!");
        assert_eq!(fix.coor_type, "bd09ll");
        assert_eq!(fix.gnss_provider, "gps");

        let address = fix.address.unwrap();
        assert_eq!(address.country.as_deref(), Some("China"));
        assert_eq!(address.address.as_deref(), Some("Dongcheng, Beijing"));
        assert!(address.town.is_none());

        let poi = &fix.poi_list.unwrap()[0];
        assert_eq!(poi.id, "poi-1");
        assert_eq!(poi.rank, 0.8);
        assert_eq!(poi.name, "Tiananmen");
        assert_eq!(poi.tags, "tourism");
        assert_eq!(poi.addr, "Chang'an Ave");
    }

    #[test]
    fn test_timestamp_parsed_in_zone() {
        // 2024-03-01 12:00:00 +08:00 == 2024-03-01 04:00:00 UTC
        let fix = run(&full_report()).fix.unwrap();
        assert_eq!(fix.timestamp, 1_709_265_600_000);
    }

    #[test]
    fn test_timestamp_fallback_to_now() {
        let mut raw = full_report();
        raw.time = Some("01/03/2024 noon".to_string());
        assert_eq!(run(&raw).fix.unwrap().timestamp, NOW);

        raw.time = None;
        assert_eq!(run(&raw).fix.unwrap().timestamp, NOW);
    }

    #[test]
    fn test_address_omitted_without_flag() {
        let mut raw = full_report();
        raw.has_addr = false;

        let event = run(&raw);
        assert!(event.fix.as_ref().unwrap().address.is_none());

        let json = serde_json::to_value(&event).unwrap();
        for key in ["country", "city", "address", "locationDescribe"] {
            assert!(json.get(key).is_none(), "{key} should be omitted");
        }
    }

    #[test]
    fn test_poi_list_presence() {
        let mut raw = full_report();
        raw.poi_list = None;
        assert!(run(&raw).fix.unwrap().poi_list.is_none());

        raw.poi_list = Some(Vec::new());
        assert_eq!(run(&raw).fix.unwrap().poi_list, Some(Vec::new()));
    }

    #[test]
    fn test_missing_status_code_is_normalization_failure() {
        let mut raw = full_report();
        raw.loc_type = None;

        let event = run(&raw);
        assert_eq!(event.error_code, ERROR_CODE_NORMALIZATION_FAILED);
        assert!(event.fix.is_none());
        assert!(event.error_message.unwrap().contains("locType"));
    }

    #[test]
    fn test_failed_fix_without_coordinates() {
        let raw: RawLocationReport =
            serde_json::from_str(r#"{"locType": 62, "locTypeDescription": "no fix"}"#).unwrap();

        let event = run(&raw);
        assert_eq!(event.error_code, ERROR_CODE_FIX_FAILED);
        assert!(event.error_message.is_none());

        let fix = event.fix.unwrap();
        assert_eq!(fix.loc_type, 62);
        assert_eq!(fix.loc_type_description, "no fix");
        assert_eq!((fix.latitude, fix.longitude), (0.0, 0.0));
    }

    #[test]
    fn test_non_finite_value_is_normalization_failure() {
        let mut raw = full_report();
        raw.altitude = Some(f64::NAN);
        assert_eq!(run(&raw).error_code, ERROR_CODE_NORMALIZATION_FAILED);

        let mut raw = full_report();
        raw.poi_list.as_mut().unwrap()[0].rank = f64::INFINITY;
        let event = run(&raw);
        assert_eq!(event.error_code, ERROR_CODE_NORMALIZATION_FAILED);
        assert!(event.error_message.unwrap().contains("poiList.rank"));
    }

    #[test]
    fn test_absent_optional_fields_default() {
        let fix = run(&RawLocationReport::fix(61, 1.0, 2.0)).fix.unwrap();
        assert_eq!(fix.altitude, 0.0);
        assert_eq!(fix.radius, 0.0);
        assert_eq!(fix.mock_gnss_probability, 0);
        assert_eq!(fix.coor_type, "");
        assert_eq!(fix.timestamp, NOW);
    }

    #[test]
    fn test_parse_report_time() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(parse_report_time("1970-01-01 00:00:01", &utc), Some(1000));
        assert_eq!(parse_report_time(" 1970-01-01 00:00:01 ", &utc), Some(1000));
        assert_eq!(parse_report_time("1970-01-01T00:00:01", &utc), None);
        assert_eq!(parse_report_time("", &utc), None);
    }

    fn arb_report() -> impl Strategy<Value = RawLocationReport> {
        (
            proptest::option::of(any::<i32>()),
            proptest::option::of(any::<f64>()),
            proptest::option::of(any::<f64>()),
            proptest::option::of(any::<f64>()),
            any::<bool>(),
            proptest::option::of(".{0,24}"),
            proptest::option::of(proptest::collection::vec(any::<f64>(), 0..3)),
        )
            .prop_map(
                |(loc_type, latitude, longitude, altitude, has_addr, time, ranks)| {
                    RawLocationReport {
                        loc_type,
                        latitude,
                        longitude,
                        altitude,
                        has_addr,
                        time,
                        poi_list: ranks.map(|ranks| {
                            ranks
                                .into_iter()
                                .map(|rank| RawPoi {
                                    rank,
                                    ..Default::default()
                                })
                                .collect()
                        }),
                        ..Default::default()
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_error_code_is_classified(raw in arb_report()) {
            let event = run(&raw);
            prop_assert!([0, -1, -2].contains(&event.error_code));
            prop_assert_eq!(event.fix.is_some(), event.error_message.is_none());
        }

        #[test]
        fn prop_success_iff_status_61_or_161(code in any::<i32>()) {
            let event = run(&RawLocationReport::fix(code, 10.0, 20.0));
            prop_assert_eq!(event.error_code == 0, code == 61 || code == 161);
        }

        #[test]
        fn prop_event_always_serializes(raw in arb_report()) {
            let event = run(&raw);
            prop_assert!(serde_json::to_value(&event).is_ok());
        }
    }
}
