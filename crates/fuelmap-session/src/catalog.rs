//! The most recent snapshot of discovered stations.

use fuelmap_core::{
    distance_km, round_tenth, BrandClassifier, Coordinate, Place, PlaceHit, PlaceId, RankedPlace,
};

/// Display name used when the provider omits one.
pub const UNNAMED_PLACE: &str = "Fuel station";

/// Stations from the latest successful search, in provider order.
///
/// A catalog is only ever replaced wholesale; results from two searches are
/// never merged.
#[derive(Debug, Clone, Default)]
pub struct PlaceCatalog {
    places: Vec<Place>,
}

impl PlaceCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts raw search hits into places.
    ///
    /// Hits without a usable coordinate are dropped. Hits that repeat an id
    /// already seen in the same batch are dropped too, keeping the first.
    #[must_use]
    pub fn from_hits(hits: Vec<PlaceHit>, classifier: &BrandClassifier) -> Vec<Place> {
        let mut places: Vec<Place> = Vec::with_capacity(hits.len());
        for hit in hits {
            let (Some(lat), Some(lng)) = (hit.lat, hit.lng) else {
                tracing::debug!(id = %hit.provider_id, "dropping hit without geometry");
                continue;
            };
            let Ok(location) = Coordinate::new(lat, lng) else {
                tracing::debug!(id = %hit.provider_id, lat, lng, "dropping hit with invalid coordinate");
                continue;
            };
            if places.iter().any(|p| p.id == hit.provider_id) {
                continue;
            }

            let name = hit
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNNAMED_PLACE.to_string());
            let brand = classifier.classify(&name);
            places.push(Place {
                id: hit.provider_id,
                name,
                location,
                brand,
            });
        }
        places
    }

    /// Discards the current contents and stores `places`.
    pub fn replace(&mut self, places: Vec<Place>) {
        self.places = places;
    }

    /// Ranks the catalog against `origin`.
    ///
    /// With an origin every entry carries a distance and the result is sorted
    /// ascending (ties keep provider order). Without one the result is in
    /// provider order with no distances.
    #[must_use]
    pub fn with_distances(&self, origin: Option<Coordinate>) -> Vec<RankedPlace> {
        let Some(origin) = origin else {
            return self
                .places
                .iter()
                .cloned()
                .map(|place| RankedPlace {
                    place,
                    distance_km: None,
                })
                .collect();
        };

        let mut ranked: Vec<(f64, RankedPlace)> = self
            .places
            .iter()
            .map(|place| {
                let exact = distance_km(origin, place.location);
                (
                    exact,
                    RankedPlace {
                        place: place.clone(),
                        distance_km: Some(round_tenth(exact)),
                    },
                )
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.into_iter().map(|(_, r)| r).collect()
    }

    #[must_use]
    pub fn get(&self, id: &PlaceId) -> Option<&Place> {
        self.places.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
