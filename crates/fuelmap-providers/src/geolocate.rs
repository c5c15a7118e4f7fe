//! Geolocation for environments without a positioning device.

use fuelmap_core::{CapabilityError, Coordinate, Geolocator};

/// Reports a position supplied up front (CLI flags, config), or a permission
/// denial when none was given so the session falls back to its default center.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredGeolocator {
    position: Option<Coordinate>,
}

impl ConfiguredGeolocator {
    #[must_use]
    pub fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

impl Geolocator for ConfiguredGeolocator {
    async fn current_position(&self) -> Result<Coordinate, CapabilityError> {
        self.position.ok_or(CapabilityError::Denied)
    }
}
