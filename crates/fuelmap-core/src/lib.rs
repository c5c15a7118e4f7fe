pub mod app_config;
pub mod brands;
pub mod capability;
pub mod config;
pub mod geo;
pub mod place;
pub mod stations;

pub use app_config::{AppConfig, Environment};
pub use brands::{BrandClassifier, BrandTag};
pub use capability::{
    CapabilityError, ClickAction, DirectionsProvider, Geolocator, MapSurface, MarkerHandle,
    MarkerIcon, MarkerSpec, NearbyQuery, PlaceHit, PlacesProvider, RouteLeg, RouteLegs,
    RouteQuery, TravelMode,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, round_tenth, Coordinate};
pub use place::{Place, PlaceId, RankedPlace};
pub use stations::{load_station_config, parse_station_config, FuelPrice, StationConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate ({lat}, {lng}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("unknown brand: {0}")]
    UnknownBrand(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stations file {path}: {source}")]
    StationsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stations file: {0}")]
    StationsFileParse(#[source] serde_yaml::Error),

    #[error("stations config validation failed: {0}")]
    Validation(String),
}
