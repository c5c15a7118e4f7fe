//! The session aggregate: every state transition of one finder view.
//!
//! `MapSession` is synchronous. It never awaits a capability; instead each
//! transition returns the [`Effect`]s the caller must run, and results come
//! back through the matching `*_resolved` method tagged with the sequence
//! number they were issued under. [`crate::runtime`] drives it from a tokio
//! task.

use std::collections::BTreeSet;

use fuelmap_core::{
    AppConfig, BrandClassifier, BrandTag, CapabilityError, Coordinate, MapSurface, MarkerHandle,
    MarkerIcon, MarkerSpec, NearbyQuery, Place, PlaceHit, PlaceId, RankedPlace, RouteLegs,
};
use serde::Serialize;

use crate::catalog::PlaceCatalog;
use crate::error::{Notice, NoticeBoard, NoticeKind, SessionError};
use crate::filter::FilterEngine;
use crate::markers::MarkerReconciler;
use crate::route::{Route, RouteController, RouteOutcome, RouteRequest, RouteState};

const YOU_ARE_HERE: &str = "You are here";

/// Tunables a session needs from the application config.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub default_center: Coordinate,
    pub search_radius_m: u32,
    pub search_category: String,
    pub nearby_radius_km: f64,
}

impl SessionSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            default_center: config.default_center,
            search_radius_m: config.search_radius_m,
            search_category: config.search_category.clone(),
            nearby_radius_km: config.nearby_radius_km,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_center: Coordinate::BUDAPEST,
            search_radius_m: 7_000,
            search_category: "gas_station".to_string(),
            nearby_radius_km: 5.0,
        }
    }
}

/// Work a transition asks its caller to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Search { seq: u64, query: NearbyQuery },
    Route(RouteRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Locating,
    Searching,
    Ready,
}

/// Read-only view of a session, published after every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub my_location: Option<Coordinate>,
    pub location_approximate: bool,
    pub search_center: Option<Coordinate>,
    pub selection: Vec<BrandTag>,
    pub catalog_size: usize,
    pub visible: Vec<RankedPlace>,
    pub nearest: Option<RankedPlace>,
    pub nearby_count: usize,
    pub nearby_radius_km: f64,
    pub destination: Option<Place>,
    pub route: Option<Route>,
    pub route_state: RouteState,
    pub notices: Vec<Notice>,
    pub marker_count: usize,
    pub in_flight: usize,
}

impl SessionSnapshot {
    /// True once the first search has resolved and nothing is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == SessionPhase::Ready && self.in_flight == 0
    }
}

pub struct MapSession<S> {
    surface: S,
    settings: SessionSettings,
    classifier: BrandClassifier,
    catalog: PlaceCatalog,
    filter: FilterEngine,
    markers: MarkerReconciler,
    route: RouteController,
    visible: Vec<RankedPlace>,
    notices: NoticeBoard,
    phase: SessionPhase,
    location_approximate: bool,
    search_center: Option<Coordinate>,
    you_marker: Option<MarkerHandle>,
    destination_marker: Option<MarkerHandle>,
    locate_seq: u64,
    live_locate: Option<u64>,
    search_seq: u64,
    live_search: Option<u64>,
}

impl<S> std::fmt::Debug for MapSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("phase", &self.phase)
            .field("catalog", &self.catalog.len())
            .field("visible", &self.visible.len())
            .field("route_state", &self.route.state())
            .finish_non_exhaustive()
    }
}

impl<S: MapSurface> MapSession<S> {
    #[must_use]
    pub fn new(surface: S, settings: SessionSettings, classifier: BrandClassifier) -> Self {
        Self {
            surface,
            settings,
            classifier,
            catalog: PlaceCatalog::new(),
            filter: FilterEngine::new(),
            markers: MarkerReconciler::new(),
            route: RouteController::new(),
            visible: Vec::new(),
            notices: NoticeBoard::default(),
            phase: SessionPhase::Locating,
            location_approximate: false,
            search_center: None,
            you_marker: None,
            destination_marker: None,
            locate_seq: 0,
            live_locate: None,
            search_seq: 0,
            live_search: None,
        }
    }

    /// Starts a locate, superseding any locate still pending. Returns the
    /// sequence number to resolve it with.
    pub fn begin_locate(&mut self) -> u64 {
        self.locate_seq += 1;
        self.live_locate = Some(self.locate_seq);
        self.phase = SessionPhase::Locating;
        self.locate_seq
    }

    /// Handles the outcome of locate `seq` and issues the follow-up search.
    ///
    /// On failure the search is centered on the last known location, or on
    /// the default center when there is none.
    pub fn location_resolved(
        &mut self,
        seq: u64,
        result: Result<Coordinate, CapabilityError>,
    ) -> Vec<Effect> {
        if self.live_locate != Some(seq) {
            tracing::debug!(seq, "discarding stale location");
            return Vec::new();
        }
        self.live_locate = None;

        let mut effects = Vec::new();
        let center = match result {
            Ok(location) => {
                tracing::info!(%location, "location acquired");
                self.location_approximate = false;
                self.notices.dismiss_kind(NoticeKind::ApproximateLocation);
                self.surface.pan_to(location);
                self.place_you_marker(location);
                effects.extend(self.route.set_my_location(location).map(Effect::Route));
                effects.extend(self.on_state_changed());
                location
            }
            Err(err) => {
                tracing::warn!(error = %err, "location unavailable; falling back");
                let center = self
                    .route
                    .my_location()
                    .unwrap_or(self.settings.default_center);
                self.location_approximate = self.route.my_location().is_none();
                self.notices.raise(&SessionError::LocationUnavailable(err));
                self.surface.pan_to(center);
                center
            }
        };

        effects.push(self.issue_search(center));
        self.phase = SessionPhase::Searching;
        self.prune(effects)
    }

    /// Handles the outcome of search `seq`. A failed search keeps the
    /// current catalog.
    pub fn search_resolved(
        &mut self,
        seq: u64,
        result: Result<Vec<PlaceHit>, CapabilityError>,
    ) -> Vec<Effect> {
        if self.live_search != Some(seq) {
            tracing::debug!(seq, "discarding stale search");
            return Vec::new();
        }
        self.live_search = None;
        self.phase = SessionPhase::Ready;

        match result {
            Ok(hits) => {
                let places = PlaceCatalog::from_hits(hits, &self.classifier);
                tracing::info!(seq, count = places.len(), "catalog replaced");
                self.catalog.replace(places);
                self.notices.dismiss_kind(NoticeKind::SearchFailed);
                let effects = self.on_state_changed();
                self.prune(effects)
            }
            Err(err) => {
                tracing::warn!(seq, error = %err, "search failed; keeping previous results");
                self.notices.raise(&SessionError::SearchFailed(err));
                Vec::new()
            }
        }
    }

    pub fn set_filter(&mut self, tags: impl IntoIterator<Item = BrandTag>) -> Vec<Effect> {
        self.filter.set_selection(tags);
        let effects = self.on_state_changed();
        self.prune(effects)
    }

    pub fn toggle_brand(&mut self, tag: BrandTag) -> Vec<Effect> {
        self.filter.toggle(tag);
        let effects = self.on_state_changed();
        self.prune(effects)
    }

    pub fn clear_filter(&mut self) -> Vec<Effect> {
        self.filter.clear();
        let effects = self.on_state_changed();
        self.prune(effects)
    }

    /// Makes the visible place `id` the destination. Choosing the current
    /// destination again retries its route.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownPlace`] when `id` is not visible.
    pub fn choose_destination(&mut self, id: &PlaceId) -> Result<Vec<Effect>, SessionError> {
        let place = self
            .visible
            .iter()
            .find(|r| r.id() == id)
            .map(|r| r.place.clone())
            .ok_or_else(|| SessionError::UnknownPlace(id.clone()))?;

        let previous = self.route.destination_id().cloned();
        let request = self.route.select_destination(place);
        self.sync_destination_marker(previous.as_ref());
        Ok(self.prune(request.map(Effect::Route).into_iter().collect()))
    }

    /// Routes a click on a station marker.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownMarker`] for handles that are not live
    /// station markers.
    pub fn click_marker(&mut self, handle: MarkerHandle) -> Result<Vec<Effect>, SessionError> {
        let id = self
            .markers
            .place_for(handle)
            .map(|p| p.id.clone())
            .ok_or(SessionError::UnknownMarker(handle))?;
        self.choose_destination(&id)
    }

    /// Handles the outcome of route request `seq`.
    pub fn route_resolved(
        &mut self,
        seq: u64,
        result: Result<RouteLegs, CapabilityError>,
    ) -> RouteOutcome {
        let outcome = self.route.apply(seq, result);
        match &outcome {
            RouteOutcome::Applied => {
                self.notices.dismiss_kind(NoticeKind::RouteFailed);
                if let (Some(from), Some(to), Some(route)) = (
                    self.route.my_location(),
                    self.route.destination(),
                    self.route.route(),
                ) {
                    self.surface
                        .draw_route(from, to.location, route.polyline.as_deref());
                }
            }
            RouteOutcome::Failed(err) => {
                self.notices.raise(&SessionError::RouteFailed(err.clone()));
            }
            RouteOutcome::Stale => {}
        }
        outcome
    }

    pub fn clear_route(&mut self) {
        self.route.clear_route();
        self.surface.clear_route();
    }

    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    /// Removes everything this session put on the map.
    pub fn shutdown(&mut self) {
        let removed = self.markers.clear(&mut self.surface);
        for handle in [self.you_marker.take(), self.destination_marker.take()]
            .into_iter()
            .flatten()
        {
            self.surface.remove_marker(handle);
        }
        self.clear_route();
        self.live_locate = None;
        self.live_search = None;
        tracing::debug!(removed, "session shut down");
    }

    #[must_use]
    pub fn snapshot(&self, in_flight: usize) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            my_location: self.route.my_location(),
            location_approximate: self.location_approximate,
            search_center: self.search_center,
            selection: self.filter.selection().iter().copied().collect(),
            catalog_size: self.catalog.len(),
            visible: self.visible.clone(),
            nearest: self.nearest().cloned(),
            nearby_count: self.nearby_count(),
            nearby_radius_km: self.settings.nearby_radius_km,
            destination: self.route.destination().cloned(),
            route: self.route.route().cloned(),
            route_state: self.route.state(),
            notices: self.notices.all().to_vec(),
            marker_count: self.markers.len(),
            in_flight,
        }
    }

    /// Closest visible station, once distances are known.
    #[must_use]
    pub fn nearest(&self) -> Option<&RankedPlace> {
        self.visible.first().filter(|r| r.distance_km.is_some())
    }

    #[must_use]
    pub fn nearby_count(&self) -> usize {
        self.route
            .nearby_count(&self.visible, self.settings.nearby_radius_km)
    }

    #[must_use]
    pub fn visible(&self) -> &[RankedPlace] {
        &self.visible
    }

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<BrandTag> {
        self.filter.selection()
    }

    #[must_use]
    pub fn route_controller(&self) -> &RouteController {
        &self.route
    }

    #[must_use]
    pub fn markers(&self) -> &MarkerReconciler {
        &self.markers
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        self.notices.all()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Recomputes the visible set and brings markers and destination in
    /// line with it. Runs once per transition.
    fn on_state_changed(&mut self) -> Vec<Effect> {
        let ranked = self.catalog.with_distances(self.route.my_location());
        self.visible = self.filter.visible(ranked);
        self.markers.reconcile(&mut self.surface, &self.visible);

        let previous = self.route.destination_id().cloned();
        let request = self.route.on_destination_missing_from_visible(&self.visible);
        self.sync_destination_marker(previous.as_ref());
        request.map(Effect::Route).into_iter().collect()
    }

    fn issue_search(&mut self, center: Coordinate) -> Effect {
        self.search_seq += 1;
        self.live_search = Some(self.search_seq);
        self.search_center = Some(center);
        Effect::Search {
            seq: self.search_seq,
            query: NearbyQuery {
                center,
                radius_m: self.settings.search_radius_m,
                category: self.settings.search_category.clone(),
            },
        }
    }

    fn place_you_marker(&mut self, location: Coordinate) {
        match self.you_marker {
            Some(handle) => self.surface.move_marker(handle, location, YOU_ARE_HERE),
            None => {
                self.you_marker = Some(self.surface.add_marker(MarkerSpec {
                    position: location,
                    title: YOU_ARE_HERE.to_string(),
                    icon: MarkerIcon::You,
                    on_click: None,
                }));
            }
        }
    }

    fn sync_destination_marker(&mut self, previous: Option<&PlaceId>) {
        let current = self.route.destination().cloned();
        if current.as_ref().map(|p| &p.id) == previous {
            return;
        }
        match current {
            Some(place) => {
                match self.destination_marker {
                    Some(handle) => self.surface.move_marker(handle, place.location, &place.name),
                    None => {
                        self.destination_marker = Some(self.surface.add_marker(MarkerSpec {
                            position: place.location,
                            title: place.name.clone(),
                            icon: MarkerIcon::DestinationFlag,
                            on_click: None,
                        }));
                    }
                }
                self.surface.pan_to(place.location);
            }
            None => {
                if let Some(handle) = self.destination_marker.take() {
                    self.surface.remove_marker(handle);
                }
                self.surface.clear_route();
            }
        }
    }

    /// Drops route requests a later step in the same transition superseded.
    fn prune(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let live = self.route.live_request();
        effects
            .into_iter()
            .filter(|e| match e {
                Effect::Route(request) => Some(request.seq) == live,
                Effect::Search { .. } => true,
            })
            .collect()
    }
}
