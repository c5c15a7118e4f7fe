//! Great-circle geometry on a spherical Earth.
//!
//! Coordinates are WGS84 degrees. Distances use the haversine formula with a
//! mean Earth radius of 6371 km, which is what the nearby-station ranking and
//! the "within N km" counter are both built on.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Mean Earth radius used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair.
///
/// Fields are private so every instance satisfies `lat ∈ [-90, 90]` and
/// `lng ∈ [-180, 180]`. Deserialization goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoreError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lng)
    }
}

impl Coordinate {
    /// Budapest city centre, the fallback map center.
    pub const BUDAPEST: Coordinate = Coordinate {
        lat: 47.4979,
        lng: 19.0402,
    };

    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when `lat` is outside
    /// `[-90, 90]`, `lng` is outside `[-180, 180]`, or either is NaN/infinite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        if lat_ok && lng_ok {
            Ok(Self { lat, lng })
        } else {
            Err(CoreError::InvalidCoordinate { lat, lng })
        }
    }

    #[must_use]
    pub fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(self) -> f64 {
        self.lng
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Great-circle distance between two coordinates in kilometres.
///
/// Identical inputs return exactly `0.0`. The haversine term is clamped to
/// `[0, 1]` before `asin` so rounding noise near antipodal points cannot
/// produce NaN. Absolute deltas keep the result bit-for-bit symmetric.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    let d_lat = (b.lat - a.lat).abs().to_radians();
    let d_lng = (b.lng - a.lng).abs().to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Rounds to one decimal place, the precision distances are shown at.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
