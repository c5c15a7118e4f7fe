//! Places Nearby Search adapter.

use fuelmap_core::{CapabilityError, NearbyQuery, PlaceHit, PlaceId, PlacesProvider};

use crate::client::GoogleMapsClient;
use crate::error::MapsError;
use crate::types::{NearbyResult, NearbySearchResponse};

const NEARBY_SEARCH_PATH: &str = "maps/api/place/nearbysearch/json";

impl GoogleMapsClient {
    /// Runs one Nearby Search around `query.center`.
    ///
    /// `ZERO_RESULTS` is an empty list, not an error. Only the first result
    /// page is read.
    ///
    /// # Errors
    ///
    /// - [`MapsError::RateLimited`] / [`MapsError::Api`] for non-`OK` statuses.
    /// - [`MapsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`MapsError::Deserialize`] if the payload does not match.
    pub async fn nearby_search(&self, query: &NearbyQuery) -> Result<Vec<PlaceHit>, MapsError> {
        let location = format!("{},{}", query.center.lat(), query.center.lng());
        let radius = query.radius_m.to_string();
        let url = self.build_url(
            NEARBY_SEARCH_PATH,
            &[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", query.category.as_str()),
            ],
        )?;

        let (_, response): (_, NearbySearchResponse) = self
            .get_json("places", &url, &["OK", "ZERO_RESULTS"])
            .await?;

        let hits: Vec<PlaceHit> = response.results.into_iter().map(to_hit).collect();
        tracing::debug!(
            center = %query.center,
            radius_m = query.radius_m,
            count = hits.len(),
            "nearby search complete"
        );
        Ok(hits)
    }
}

fn to_hit(result: NearbyResult) -> PlaceHit {
    let location = result.geometry.and_then(|g| g.location);
    PlaceHit {
        provider_id: PlaceId::new(result.place_id),
        name: result.name,
        lat: location.map(|l| l.lat),
        lng: location.map(|l| l.lng),
    }
}

impl PlacesProvider for GoogleMapsClient {
    async fn search(&self, query: &NearbyQuery) -> Result<Vec<PlaceHit>, CapabilityError> {
        self.nearby_search(query).await.map_err(CapabilityError::from)
    }
}
