//! Wire types for the Google Maps Places and Directions JSON APIs.
//!
//! Only the fields the finder consumes are modelled; everything else in the
//! payload is ignored by serde.

use serde::Deserialize;

/// Status envelope shared by every Maps web-service response.
#[derive(Debug, Deserialize)]
pub struct StatusEnvelope {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    #[serde(default)]
    pub results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyResult {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
    #[serde(default)]
    pub overview_polyline: Option<OverviewPolyline>,
}

/// One leg. Google omits `distance`/`duration` on some transit legs, so both
/// are optional and count as zero when absent.
#[derive(Debug, Deserialize)]
pub struct DirectionsLeg {
    #[serde(default)]
    pub distance: Option<ValueText>,
    #[serde(default)]
    pub duration: Option<ValueText>,
}

#[derive(Debug, Deserialize)]
pub struct ValueText {
    pub value: u64,
}

#[derive(Debug, Deserialize)]
pub struct OverviewPolyline {
    pub points: String,
}
