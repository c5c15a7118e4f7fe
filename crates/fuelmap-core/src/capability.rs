//! External capabilities the finder integrates against.
//!
//! Geolocation, nearby-places search, directions and map rendering are owned
//! by third parties. Each is a trait here so the session can be driven by the
//! HTTP adapters in `fuelmap-providers` in production and by in-memory fakes
//! in tests.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;
use crate::place::PlaceId;

/// Failure modes surfaced by any capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The user or platform refused to reveal the current position.
    #[error("location permission denied")]
    Denied,

    /// The capability did not answer within its time bound.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// Directions could not connect origin and destination.
    #[error("no route found")]
    NoRouteFound,

    /// Network, HTTP, or provider-level failure.
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },
}

/// Parameters of one nearby-places search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyQuery {
    pub center: Coordinate,
    pub radius_m: u32,
    /// Provider category, e.g. `gas_station`.
    pub category: String,
}

/// One raw search result. Geometry and name are optional because providers
/// occasionally omit them; the catalog decides what to do with such hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceHit {
    pub provider_id: PlaceId,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
}

impl TravelMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TravelMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_m: u64,
    pub duration_s: u64,
}

/// A directions answer: the legs of the chosen route and, when available,
/// its encoded overview polyline for drawing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteLegs {
    pub legs: Vec<RouteLeg>,
    pub polyline: Option<String>,
}

impl RouteLegs {
    #[must_use]
    pub fn total_distance_m(&self) -> u64 {
        self.legs.iter().map(|leg| leg.distance_m).sum()
    }

    #[must_use]
    pub fn total_duration_s(&self) -> u64 {
        self.legs.iter().map(|leg| leg.duration_s).sum()
    }
}

/// Source of the user's current position.
pub trait Geolocator: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, CapabilityError>> + Send;
}

/// Nearby-places search.
pub trait PlacesProvider: Send + Sync {
    fn search(
        &self,
        query: &NearbyQuery,
    ) -> impl Future<Output = Result<Vec<PlaceHit>, CapabilityError>> + Send;
}

/// Turn-by-turn routing between two points.
pub trait DirectionsProvider: Send + Sync {
    fn route(
        &self,
        query: &RouteQuery,
    ) -> impl Future<Output = Result<RouteLegs, CapabilityError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    FuelPump,
    You,
    DestinationFlag,
}

/// What a marker does when the user clicks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClickAction {
    SelectDestination(PlaceId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub position: Coordinate,
    pub title: String,
    pub icon: MarkerIcon,
    pub on_click: Option<ClickAction>,
}

/// The rendered map. Implementations own the actual marker objects; callers
/// only ever hold [`MarkerHandle`]s.
pub trait MapSurface: Send {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle;

    fn remove_marker(&mut self, handle: MarkerHandle);

    fn move_marker(&mut self, handle: MarkerHandle, position: Coordinate, title: &str);

    fn pan_to(&mut self, center: Coordinate);

    fn draw_route(&mut self, origin: Coordinate, destination: Coordinate, polyline: Option<&str>);

    fn clear_route(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_legs_sum_all_legs() {
        let legs = RouteLegs {
            legs: vec![
                RouteLeg {
                    distance_m: 1_200,
                    duration_s: 90,
                },
                RouteLeg {
                    distance_m: 3_050,
                    duration_s: 240,
                },
            ],
            polyline: None,
        };
        assert_eq!(legs.total_distance_m(), 4_250);
        assert_eq!(legs.total_duration_s(), 330);
    }

    #[test]
    fn capability_error_messages_are_readable() {
        let err = CapabilityError::Provider {
            provider: "places".to_string(),
            message: "OVER_QUERY_LIMIT".to_string(),
        };
        assert_eq!(err.to_string(), "places error: OVER_QUERY_LIMIT");
        assert_eq!(CapabilityError::Timeout(4000).to_string(), "timed out after 4000 ms");
    }
}
