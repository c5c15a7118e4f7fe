//! Directions adapter.

use fuelmap_core::{CapabilityError, DirectionsProvider, RouteLeg, RouteLegs, RouteQuery};

use crate::client::GoogleMapsClient;
use crate::error::MapsError;
use crate::types::DirectionsResponse;

const DIRECTIONS_PATH: &str = "maps/api/directions/json";

impl GoogleMapsClient {
    /// Requests a route and returns the legs of the first (recommended) one.
    ///
    /// Alternatives are not requested.
    ///
    /// # Errors
    ///
    /// - [`MapsError::NoRoute`] for `ZERO_RESULTS`, `NOT_FOUND`, or an empty
    ///   route list.
    /// - [`MapsError::RateLimited`] / [`MapsError::Api`] for other non-`OK`
    ///   statuses.
    /// - [`MapsError::Http`] / [`MapsError::Deserialize`] as for every call.
    pub async fn directions(&self, query: &RouteQuery) -> Result<RouteLegs, MapsError> {
        let origin = query.origin.to_string();
        let destination = query.destination.to_string();
        let url = self.build_url(
            DIRECTIONS_PATH,
            &[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", query.mode.as_str()),
                ("alternatives", "false"),
            ],
        )?;

        let (status, response): (String, DirectionsResponse) = self
            .get_json("directions", &url, &["OK", "ZERO_RESULTS", "NOT_FOUND"])
            .await?;
        if status != "OK" {
            return Err(MapsError::NoRoute);
        }

        let route = response.routes.into_iter().next().ok_or(MapsError::NoRoute)?;
        let legs = route
            .legs
            .into_iter()
            .map(|leg| RouteLeg {
                distance_m: leg.distance.map_or(0, |d| d.value),
                duration_s: leg.duration.map_or(0, |d| d.value),
            })
            .collect();

        Ok(RouteLegs {
            legs,
            polyline: route.overview_polyline.map(|p| p.points),
        })
    }
}

impl DirectionsProvider for GoogleMapsClient {
    async fn route(&self, query: &RouteQuery) -> Result<RouteLegs, CapabilityError> {
        self.directions(query).await.map_err(CapabilityError::from)
    }
}
