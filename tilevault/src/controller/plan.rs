//! Single-use confirmation tokens and operation outcomes.

use crate::coord::LatLngBounds;
use crate::fetch::SaveReport;
use crate::tile::TileRequest;

use super::state::PendingGuard;

/// The visible map area a save starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub bounds: LatLngBounds,
    pub zoom: u8,
}

impl MapView {
    pub fn new(bounds: LatLngBounds, zoom: u8) -> Self {
        Self { bounds, zoom }
    }
}

/// An enumerated save awaiting confirmation.
///
/// Pass it to `OfflineController::commit_save` to fetch, or drop it to
/// abandon the save.
#[must_use = "dropping a SavePlan abandons the save"]
#[derive(Debug)]
pub struct SavePlan {
    pub(crate) view: MapView,
    pub(crate) requests: Vec<TileRequest>,
    pub(crate) guard: PendingGuard,
}

impl SavePlan {
    /// Number of tiles that would be fetched.
    pub fn count(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn requests(&self) -> &[TileRequest] {
        &self.requests
    }
}

/// A store clear awaiting confirmation.
#[must_use = "dropping a RemovalPlan abandons the removal"]
#[derive(Debug)]
pub struct RemovalPlan {
    pub(crate) count: Option<usize>,
    pub(crate) guard: PendingGuard,
}

impl RemovalPlan {
    /// Store size at planning time, when it was queried.
    pub fn count(&self) -> Option<usize> {
        self.count
    }
}

/// Result of [`save_view`](super::OfflineController::save_view).
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Completed(SaveReport),
    Declined,
}

impl SaveOutcome {
    pub fn report(&self) -> Option<&SaveReport> {
        match self {
            SaveOutcome::Completed(report) => Some(report),
            SaveOutcome::Declined => None,
        }
    }
}

/// Result of [`remove_all`](super::OfflineController::remove_all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed { count: Option<usize> },
    Declined,
}
