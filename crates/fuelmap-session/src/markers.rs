//! Keeps rendered station markers in step with the visible set.

use std::collections::{HashMap, HashSet};

use fuelmap_core::{
    ClickAction, MapSurface, MarkerHandle, MarkerIcon, MarkerSpec, Place, PlaceId, RankedPlace,
};
use serde::Serialize;

/// Counts of surface operations performed by one [`MarkerReconciler::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: usize,
    pub removed: usize,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

#[derive(Debug)]
struct LiveMarker {
    handle: MarkerHandle,
    place: Place,
}

/// Sole owner of station markers on the map surface.
///
/// After every [`reconcile`](Self::reconcile) the live markers correspond
/// one-to-one with the ids of the visible set passed in.
#[derive(Debug, Default)]
pub struct MarkerReconciler {
    live: HashMap<PlaceId, LiveMarker>,
    by_handle: HashMap<MarkerHandle, PlaceId>,
}

impl MarkerReconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes markers for places no longer visible, then adds markers for
    /// newly visible ones. Places that stay visible keep their marker.
    pub fn reconcile<S: MapSurface>(
        &mut self,
        surface: &mut S,
        visible: &[RankedPlace],
    ) -> ReconcileReport {
        let wanted: HashSet<&PlaceId> = visible.iter().map(RankedPlace::id).collect();
        let mut report = ReconcileReport::default();

        let stale: Vec<PlaceId> = self
            .live
            .keys()
            .filter(|id| !wanted.contains(id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(marker) = self.live.remove(&id) {
                surface.remove_marker(marker.handle);
                self.by_handle.remove(&marker.handle);
                report.removed += 1;
            }
        }

        for entry in visible {
            if self.live.contains_key(entry.id()) {
                continue;
            }
            let place = &entry.place;
            let handle = surface.add_marker(MarkerSpec {
                position: place.location,
                title: place.name.clone(),
                icon: MarkerIcon::FuelPump,
                on_click: Some(ClickAction::SelectDestination(place.id.clone())),
            });
            self.by_handle.insert(handle, place.id.clone());
            self.live.insert(
                place.id.clone(),
                LiveMarker {
                    handle,
                    place: place.clone(),
                },
            );
            report.added += 1;
        }

        if !report.is_noop() {
            tracing::debug!(
                added = report.added,
                removed = report.removed,
                live = self.live.len(),
                "markers reconciled"
            );
        }
        report
    }

    /// The place behind a station marker, if `handle` is one of ours.
    #[must_use]
    pub fn place_for(&self, handle: MarkerHandle) -> Option<&Place> {
        self.by_handle
            .get(&handle)
            .and_then(|id| self.live.get(id))
            .map(|m| &m.place)
    }

    #[must_use]
    pub fn handle_for(&self, id: &PlaceId) -> Option<MarkerHandle> {
        self.live.get(id).map(|m| m.handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Destroys every station marker.
    pub fn clear<S: MapSurface>(&mut self, surface: &mut S) -> usize {
        let removed = self.live.len();
        for (_, marker) in self.live.drain() {
            surface.remove_marker(marker.handle);
        }
        self.by_handle.clear();
        removed
    }
}
