pub mod client;
pub mod directions;
pub mod error;
pub mod geolocate;
pub mod places;
pub(crate) mod retry;
pub mod types;

pub use client::{GoogleMapsClient, HttpSettings};
pub use error::MapsError;
pub use geolocate::ConfiguredGeolocator;
