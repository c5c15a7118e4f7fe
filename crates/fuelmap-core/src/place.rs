//! Domain types for discovered fuel stations.

use serde::{Deserialize, Serialize};

use crate::brands::BrandTag;
use crate::geo::Coordinate;

/// Provider-issued place identifier, stable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fuel station returned by a nearby-places search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub location: Coordinate,
    /// `None` when the name matched no known brand.
    pub brand: Option<BrandTag>,
}

/// A [`Place`] plus its distance from the user, once the user's position is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlace {
    pub place: Place,
    /// Great-circle distance in km rounded to one decimal.
    pub distance_km: Option<f64>,
}

impl RankedPlace {
    #[must_use]
    pub fn id(&self) -> &PlaceId {
        &self.place.id
    }
}
