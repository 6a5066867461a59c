//! Location event normalization.
//!
//! Engines deliver [`RawLocationReport`]s with whatever fields they managed to
//! resolve. The normalizer maps each one to exactly one
//! [`CanonicalLocationEvent`] with deterministic field presence:
//!
//! ```text
//! RawLocationReport ──normalize()──► CanonicalLocationEvent
//!                                    errorCode  0  status 61 / 161
//!                                              -1  any other status
//!                                              -2  report unusable
//! ```
//!
//! A `-1` event still carries every field the engine supplied. A `-2` event
//! carries only `errorCode` and `errorMessage`.

mod canonical;
mod normalize;
mod report;

pub use canonical::{
    AddressFields, CanonicalLocationEvent, FixDetails, PoiEntry, ERROR_CODE_FIX_FAILED,
    ERROR_CODE_NORMALIZATION_FAILED, ERROR_CODE_SUCCESS,
};
pub use normalize::{normalize, normalize_with, parse_report_time, NormalizeError, REPORT_TIME_FORMAT};
pub use report::{RawAddress, RawLocationReport, RawPoi, LOC_TYPE_GNSS, LOC_TYPE_NETWORK};
