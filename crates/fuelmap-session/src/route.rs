//! Location, destination, and route state.
//!
//! The controller never calls a directions provider itself. It hands out
//! [`RouteRequest`]s and later receives their results through
//! [`RouteController::apply`], which is where "last request wins" is
//! enforced: only the most recently issued, still-live request may change the
//! route.

use fuelmap_core::{
    round_tenth, CapabilityError, Coordinate, Place, PlaceId, RankedPlace, RouteLegs,
};
use serde::Serialize;

/// A computed driving route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub distance_km: f64,
    pub eta_minutes: i64,
    pub polyline: Option<String>,
}

impl Route {
    /// Sums the legs into kilometres (one decimal) and whole minutes.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn from_legs(legs: &RouteLegs) -> Self {
        let meters = legs.total_distance_m() as f64;
        let seconds = legs.total_duration_s() as f64;
        Self {
            distance_km: round_tenth(meters / 1000.0),
            eta_minutes: (seconds / 60.0).round() as i64,
            polyline: legs.polyline.clone(),
        }
    }
}

/// One route computation to run against the directions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub seq: u64,
    pub from: Coordinate,
    pub to: Place,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Applied,
    /// A newer request was issued or the request was invalidated.
    Stale,
    /// The provider failed; the previous route is kept.
    Failed(CapabilityError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteState {
    NoLocation,
    Located,
    DestinationChosen,
    RouteReady,
}

#[derive(Debug, Default)]
pub struct RouteController {
    my_location: Option<Coordinate>,
    destination: Option<Place>,
    route: Option<Route>,
    issued: u64,
    live: Option<u64>,
}

impl RouteController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn my_location(&self) -> Option<Coordinate> {
        self.my_location
    }

    #[must_use]
    pub fn destination(&self) -> Option<&Place> {
        self.destination.as_ref()
    }

    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Sequence number of the request whose result would still be applied.
    #[must_use]
    pub fn live_request(&self) -> Option<u64> {
        self.live
    }

    #[must_use]
    pub fn state(&self) -> RouteState {
        match (self.my_location, &self.destination, &self.route) {
            (None, _, _) => RouteState::NoLocation,
            (Some(_), _, Some(_)) => RouteState::RouteReady,
            (Some(_), Some(_), None) => RouteState::DestinationChosen,
            (Some(_), None, None) => RouteState::Located,
        }
    }

    /// Records the user's position. Returns a recompute when a destination
    /// is already chosen.
    pub fn set_my_location(&mut self, location: Coordinate) -> Option<RouteRequest> {
        self.my_location = Some(location);
        self.request_route()
    }

    /// Makes `place` the destination. Returns a recompute when the location
    /// is known; otherwise the route waits for it.
    pub fn select_destination(&mut self, place: Place) -> Option<RouteRequest> {
        tracing::debug!(id = %place.id, name = %place.name, "destination selected");
        self.destination = Some(place);
        self.request_route()
    }

    /// Repairs the destination after the visible set changed.
    ///
    /// A destination that is still visible is left alone. Otherwise the
    /// closest visible entry becomes the destination, or, when nothing is
    /// visible, destination and route are cleared.
    pub fn on_destination_missing_from_visible(
        &mut self,
        visible: &[RankedPlace],
    ) -> Option<RouteRequest> {
        if let Some(current) = &self.destination {
            if visible.iter().any(|r| r.id() == &current.id) {
                return None;
            }
        }

        match visible.first() {
            Some(first) => self.select_destination(first.place.clone()),
            None => {
                if self.destination.is_some() || self.route.is_some() {
                    tracing::debug!("nothing visible; clearing destination and route");
                }
                self.destination = None;
                self.route = None;
                self.live = None;
                None
            }
        }
    }

    /// Applies the result of request `seq`.
    pub fn apply(&mut self, seq: u64, result: Result<RouteLegs, CapabilityError>) -> RouteOutcome {
        if self.live != Some(seq) {
            tracing::debug!(seq, live = ?self.live, "discarding stale route");
            return RouteOutcome::Stale;
        }
        self.live = None;

        match result {
            Ok(legs) => {
                let route = Route::from_legs(&legs);
                tracing::debug!(
                    seq,
                    distance_km = route.distance_km,
                    eta_minutes = route.eta_minutes,
                    "route applied"
                );
                self.route = Some(route);
                RouteOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(seq, error = %err, "route request failed; keeping previous route");
                RouteOutcome::Failed(err)
            }
        }
    }

    /// Drops the current route and invalidates any in-flight request. The
    /// destination is kept.
    pub fn clear_route(&mut self) {
        self.route = None;
        self.live = None;
    }

    /// Visible entries within `radius_km` of the user. Zero while the
    /// location is unknown.
    #[must_use]
    pub fn nearby_count(&self, visible: &[RankedPlace], radius_km: f64) -> usize {
        if self.my_location.is_none() {
            return 0;
        }
        visible
            .iter()
            .filter(|r| r.distance_km.is_some_and(|d| d <= radius_km))
            .count()
    }

    #[must_use]
    pub fn destination_id(&self) -> Option<&PlaceId> {
        self.destination.as_ref().map(|p| &p.id)
    }

    fn request_route(&mut self) -> Option<RouteRequest> {
        let from = self.my_location?;
        let to = self.destination.clone()?;
        self.issued += 1;
        self.live = Some(self.issued);
        Some(RouteRequest {
            seq: self.issued,
            from,
            to,
        })
    }
}
