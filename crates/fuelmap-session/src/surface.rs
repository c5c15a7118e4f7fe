//! In-memory [`MapSurface`] that records every operation.
//!
//! Used by the CLI in place of a real map widget and by tests to assert on
//! exactly which marker operations a transition performed. The log keeps the
//! most recent [`DEFAULT_OP_LOG_LIMIT`] operations unless configured
//! otherwise.

use std::collections::BTreeMap;

use fuelmap_core::{ClickAction, Coordinate, MapSurface, MarkerHandle, MarkerSpec};
use serde::Serialize;

pub const DEFAULT_OP_LOG_LIMIT: usize = 256;

/// One call made against the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    AddMarker { handle: MarkerHandle },
    RemoveMarker { handle: MarkerHandle },
    MoveMarker { handle: MarkerHandle },
    PanTo { center: Coordinate },
    DrawRoute,
    ClearRoute,
}

/// The route line currently drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnRoute {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub polyline: Option<String>,
}

#[derive(Debug)]
pub struct RecordingSurface {
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    ops: Vec<SurfaceOp>,
    op_limit: usize,
    center: Option<Coordinate>,
    route: Option<DrawnRoute>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::with_op_limit(DEFAULT_OP_LOG_LIMIT)
    }
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose log holds at most `op_limit` operations, oldest
    /// dropped first. Zero disables the log.
    #[must_use]
    pub fn with_op_limit(op_limit: usize) -> Self {
        Self {
            next_handle: 0,
            markers: BTreeMap::new(),
            ops: Vec::new(),
            op_limit,
            center: None,
            route: None,
        }
    }

    /// Live markers keyed by handle.
    #[must_use]
    pub fn markers(&self) -> &BTreeMap<MarkerHandle, MarkerSpec> {
        &self.markers
    }

    #[must_use]
    pub fn marker(&self, handle: MarkerHandle) -> Option<&MarkerSpec> {
        self.markers.get(&handle)
    }

    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drains the operation log.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    #[must_use]
    pub fn center(&self) -> Option<Coordinate> {
        self.center
    }

    #[must_use]
    pub fn route(&self) -> Option<&DrawnRoute> {
        self.route.as_ref()
    }

    fn record(&mut self, op: SurfaceOp) {
        if self.op_limit == 0 {
            return;
        }
        if self.ops.len() >= self.op_limit {
            let excess = self.ops.len() + 1 - self.op_limit;
            self.ops.drain(..excess);
        }
        self.ops.push(op);
    }

    /// The action a click on `handle` would trigger.
    #[must_use]
    pub fn click(&self, handle: MarkerHandle) -> Option<&ClickAction> {
        self.markers.get(&handle).and_then(|m| m.on_click.as_ref())
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        tracing::trace!(handle = handle.0, title = %spec.title, icon = ?spec.icon, "add marker");
        self.markers.insert(handle, spec);
        self.record(SurfaceOp::AddMarker { handle });
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        if self.markers.remove(&handle).is_none() {
            tracing::warn!(handle = handle.0, "remove of unknown marker");
        }
        tracing::trace!(handle = handle.0, "remove marker");
        self.record(SurfaceOp::RemoveMarker { handle });
    }

    fn move_marker(&mut self, handle: MarkerHandle, position: Coordinate, title: &str) {
        if let Some(marker) = self.markers.get_mut(&handle) {
            marker.position = position;
            title.clone_into(&mut marker.title);
        } else {
            tracing::warn!(handle = handle.0, "move of unknown marker");
        }
        self.record(SurfaceOp::MoveMarker { handle });
    }

    fn pan_to(&mut self, center: Coordinate) {
        tracing::trace!(%center, "pan");
        self.center = Some(center);
        self.record(SurfaceOp::PanTo { center });
    }

    fn draw_route(&mut self, origin: Coordinate, destination: Coordinate, polyline: Option<&str>) {
        tracing::trace!(%origin, %destination, "draw route");
        self.route = Some(DrawnRoute {
            origin,
            destination,
            polyline: polyline.map(str::to_string),
        });
        self.record(SurfaceOp::DrawRoute);
    }

    fn clear_route(&mut self) {
        self.route = None;
        self.record(SurfaceOp::ClearRoute);
    }
}
