//! Lifecycle events emitted by the controller.

use tokio::sync::mpsc;
use tracing::trace;

use crate::fetch::TileError;
use crate::store::StoreError;

/// A save or removal lifecycle event.
///
/// Events for one operation are delivered in order: a start event, then any
/// per-tile events, then exactly one terminal event.
#[derive(Debug, Clone)]
pub enum OfflineEvent {
    /// A save was requested below the configured minimum zoom.
    BelowMinZoom { zoom: u8, min_zoom: u8 },

    /// A save would request more tiles than `max_tiles`. `count` is `None`
    /// when the total does not fit in a `u64`.
    TooManyTiles { count: Option<u64>, max_tiles: u64 },

    /// Fetching is about to begin for `count` tiles.
    SaveStart { count: usize },

    /// One tile was fetched and stored.
    TileSaved { key: String, url: String },

    /// One tile failed. The save continues.
    SaveTileError {
        key: String,
        url: String,
        error: TileError,
    },

    /// Every tile of the save was stored.
    SaveEnd { saved: usize },

    /// The save finished with failures.
    SaveError {
        saved: usize,
        failed: usize,
        error: String,
    },

    /// The store is about to be cleared. `count` is the size reported
    /// beforehand, when it was queried.
    RemoveStart { count: Option<usize> },

    /// The store was cleared.
    RemoveEnd,

    /// Clearing the store failed.
    RemoveTilesError { error: StoreError },

    /// Querying the store size before a removal failed.
    SizeError { error: StoreError },
}

impl OfflineEvent {
    /// Short event name, matching the variant.
    pub fn name(&self) -> &'static str {
        match self {
            OfflineEvent::BelowMinZoom { .. } => "below_min_zoom",
            OfflineEvent::TooManyTiles { .. } => "too_many_tiles",
            OfflineEvent::SaveStart { .. } => "save_start",
            OfflineEvent::TileSaved { .. } => "tile_saved",
            OfflineEvent::SaveTileError { .. } => "save_tile_error",
            OfflineEvent::SaveEnd { .. } => "save_end",
            OfflineEvent::SaveError { .. } => "save_error",
            OfflineEvent::RemoveStart { .. } => "remove_start",
            OfflineEvent::RemoveEnd => "remove_end",
            OfflineEvent::RemoveTilesError { .. } => "remove_tiles_error",
            OfflineEvent::SizeError { .. } => "size_error",
        }
    }

    /// Ends a save or removal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OfflineEvent::BelowMinZoom { .. }
                | OfflineEvent::TooManyTiles { .. }
                | OfflineEvent::SaveEnd { .. }
                | OfflineEvent::SaveError { .. }
                | OfflineEvent::RemoveEnd
                | OfflineEvent::RemoveTilesError { .. }
                | OfflineEvent::SizeError { .. }
        )
    }
}

/// Sends events to an optional listener.
///
/// A controller without a listener still runs; its events are dropped.
#[derive(Debug, Clone, Default)]
pub struct EventEmitter {
    tx: Option<mpsc::UnboundedSender<OfflineEvent>>,
}

impl EventEmitter {
    pub fn new(tx: mpsc::UnboundedSender<OfflineEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// An emitter that drops every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: OfflineEvent) {
        trace!(event = event.name(), "Emitting event");
        if let Some(tx) = &self.tx {
            // Listener gone; the operation still completes.
            let _ = tx.send(event);
        }
    }
}

/// Creates an emitter and the receiver its events arrive on.
pub fn event_channel() -> (EventEmitter, mpsc::UnboundedReceiver<OfflineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventEmitter::new(tx), rx)
}
