//! Controller error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Errors that end a save or removal before it starts, or a removal midway.
///
/// Per-tile failures are not errors at this level; they are reported in the
/// save's [`SaveReport`](crate::fetch::SaveReport) and events.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The view zoom is below the configured minimum.
    #[error("zoom {zoom} is below the minimum offline zoom {min_zoom}")]
    BelowMinZoom { zoom: u8, min_zoom: u8 },

    /// The save would request more tiles than the configured cap.
    #[error("save would request {} tiles, more than the limit of {max_tiles}", count_label(.count))]
    TooManyTiles { count: Option<u64>, max_tiles: u64 },

    /// The store size could not be queried before a removal.
    #[error("failed to query store size: {0}")]
    Size(StoreError),

    /// Clearing the store failed.
    #[error("failed to clear store: {0}")]
    Clear(StoreError),

    /// The plan was issued by a different controller.
    #[error("plan does not belong to this controller")]
    ForeignPlan,

    /// The controller configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

fn count_label(count: &Option<u64>) -> String {
    count.map_or_else(|| "too many".to_string(), |c| c.to_string())
}

/// Result type for controller operations.
pub type ControllerResult<T> = Result<T, ControllerError>;
