use fuelmap_core::{CapabilityError, MarkerHandle, PlaceId};
use serde::Serialize;
use thiserror::Error;

/// Everything that can go wrong inside a session. None of it is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("location unavailable ({0}); results are centered on an approximate position")]
    LocationUnavailable(CapabilityError),

    #[error("station search failed: {0}")]
    SearchFailed(CapabilityError),

    #[error("route could not be computed: {0}")]
    RouteFailed(CapabilityError),

    #[error("place {0} is not in the current results")]
    UnknownPlace(PlaceId),

    #[error("{0:?} is not a station marker")]
    UnknownMarker(MarkerHandle),

    #[error("session has shut down")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ApproximateLocation,
    SearchFailed,
    RouteFailed,
}

/// A dismissible message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Active notices in the order they were raised.
#[derive(Debug, Default)]
pub(crate) struct NoticeBoard {
    next_id: u64,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    /// Raises a notice for `error`. A notice of the same kind that is still
    /// showing is replaced rather than stacked.
    pub(crate) fn raise(&mut self, error: &SessionError) -> Option<u64> {
        let kind = match error {
            SessionError::LocationUnavailable(_) => NoticeKind::ApproximateLocation,
            SessionError::SearchFailed(_) => NoticeKind::SearchFailed,
            SessionError::RouteFailed(_) => NoticeKind::RouteFailed,
            SessionError::UnknownPlace(_) | SessionError::UnknownMarker(_) | SessionError::Closed => {
                return None;
            }
        };
        self.notices.retain(|n| n.kind != kind);
        self.next_id += 1;
        self.notices.push(Notice {
            id: self.next_id,
            kind,
            message: error.to_string(),
        });
        Some(self.next_id)
    }

    pub(crate) fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub(crate) fn dismiss_kind(&mut self, kind: NoticeKind) {
        self.notices.retain(|n| n.kind != kind);
    }

    pub(crate) fn all(&self) -> &[Notice] {
        &self.notices
    }
}
