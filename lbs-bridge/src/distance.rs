//! Geodesic distance between two coordinates.
//!
//! Uses Vincenty's inverse solution on the WGS84 ellipsoid. Coordinates are
//! not range-checked; whatever the caller passes goes straight into the
//! formula.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// WGS84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in meters.
const WGS84_B: f64 = 6_356_752.3142;
/// Iteration cap for the lambda recurrence.
const MAX_ITERATIONS: usize = 20;
/// Convergence threshold for the relative change in lambda.
const CONVERGENCE: f64 = 1.0e-12;

/// Host key for latitude in a point map.
pub const KEY_LATITUDE: &str = "latitude";
/// Host key for longitude in a point map.
pub const KEY_LONGITUDE: &str = "longitude";

/// A point supplied to [`distance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A point map was missing a required numeric field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Point is missing numeric field `{field}`")]
pub struct InvalidCoordinateError {
    pub field: &'static str,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Read a point from the host's `{latitude, longitude}` map.
    ///
    /// Fails only when a field is absent or not a number.
    pub fn from_value(value: &Value) -> Result<Self, InvalidCoordinateError> {
        let field = |name: &'static str| {
            value
                .get(name)
                .and_then(Value::as_f64)
                .ok_or(InvalidCoordinateError { field: name })
        };

        Ok(Self {
            latitude: field(KEY_LATITUDE)?,
            longitude: field(KEY_LONGITUDE)?,
        })
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.latitude
            .total_cmp(&other.latitude)
            .then(self.longitude.total_cmp(&other.longitude))
    }
}

/// Distance in meters between two points.
///
/// Symmetric bit-for-bit: the pair is put into a canonical order before the
/// iteration runs.
pub fn distance(p1: Coordinate, p2: Coordinate) -> f64 {
    let (from, to) = match p1.total_cmp(&p2) {
        Ordering::Greater => (p2, p1),
        _ => (p1, p2),
    };
    vincenty_inverse(from, to)
}

fn vincenty_inverse(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let l = (to.longitude - from.longitude).to_radians();

    let f = (WGS84_A - WGS84_B) / WGS84_A;
    let a_sq_minus_b_sq_over_b_sq = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

    let u1 = ((1.0 - f) * lat1.tan()).atan();
    let u2 = ((1.0 - f) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();
    let cos_u1_cos_u2 = cos_u1 * cos_u2;
    let sin_u1_sin_u2 = sin_u1 * sin_u2;

    let mut lambda = l;
    let mut a_coef = 0.0;
    let mut sigma = 0.0;
    let mut delta_sigma = 0.0;

    for _ in 0..MAX_ITERATIONS {
        let lambda_orig = lambda;
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        let cos_sigma = sin_u1_sin_u2 + cos_u1_cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = if sin_sigma == 0.0 {
            0.0
        } else {
            cos_u1_cos_u2 * sin_lambda / sin_sigma
        };
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sm = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1_sin_u2 / cos_sq_alpha
        };

        let u_squared = cos_sq_alpha * a_sq_minus_b_sq_over_b_sq;
        a_coef = 1.0
            + (u_squared / 16384.0)
                * (4096.0 + u_squared * (-768.0 + u_squared * (320.0 - 175.0 * u_squared)));
        let b_coef =
            (u_squared / 1024.0) * (256.0 + u_squared * (-128.0 + u_squared * (74.0 - 47.0 * u_squared)));
        let c_coef = (f / 16.0) * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let cos_2sm_sq = cos_2sm * cos_2sm;

        delta_sigma = b_coef
            * sin_sigma
            * (cos_2sm
                + (b_coef / 4.0)
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sm_sq)
                        - (b_coef / 6.0)
                            * cos_2sm
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sm_sq)));

        lambda = l
            + (1.0 - c_coef)
                * f
                * sin_alpha
                * (sigma
                    + c_coef
                        * sin_sigma
                        * (cos_2sm + c_coef * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));

        if lambda == 0.0 || ((lambda - lambda_orig) / lambda).abs() < CONVERGENCE {
            break;
        }
    }

    WGS84_B * a_coef * (sigma - delta_sigma)
}
