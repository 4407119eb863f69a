//! Cache-first tile source resolution.
//!
//! When a map layer needs a tile it asks the resolver where to load it from:
//! the offline store when the tile was saved earlier, the network otherwise.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::coord::{CoordError, TileCoord};
use crate::store::{StoreError, TileBlob, TileStore};
use crate::tile::TileUrlTemplate;

/// Why a tile source could not be resolved.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The coordinate is outside the supported tile grid.
    #[error("invalid tile coordinate: {0}")]
    Coord(#[from] CoordError),

    /// The store lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where a tile should be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSource {
    /// The tile is in the offline store.
    Cached { key: String, blob: TileBlob },
    /// The tile is not stored; load it from this URL.
    Network(String),
}

impl TileSource {
    pub fn is_cached(&self) -> bool {
        matches!(self, TileSource::Cached { .. })
    }
}

impl fmt::Display for TileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileSource::Cached { blob, .. } => {
                write!(f, "cached ({} bytes, {})", blob.len(), blob.content_type())
            }
            TileSource::Network(url) => write!(f, "{}", url),
        }
    }
}

/// Resolves tile coordinates to a cached blob or a network URL.
#[derive(Clone)]
pub struct OfflineTileResolver {
    template: TileUrlTemplate,
    store: Arc<dyn TileStore>,
}

impl OfflineTileResolver {
    pub fn new(template: TileUrlTemplate, store: Arc<dyn TileStore>) -> Self {
        Self { template, store }
    }

    pub fn template(&self) -> &TileUrlTemplate {
        &self.template
    }

    /// Looks up `coord` in the store under its canonical key.
    ///
    /// Zooms beyond [`MAX_ZOOM`](crate::coord::MAX_ZOOM) are rejected. A
    /// storage failure is returned as is; nothing is retried and the network
    /// URL is not substituted.
    pub async fn resolve_tile_source(&self, coord: TileCoord) -> Result<TileSource, ResolveError> {
        coord.validate()?;
        let url = self.template.resolve(&coord);
        let key = self.template.key_for(&url);

        match self.store.get(&key).await? {
            Some(blob) => {
                debug!(%coord, key = %key, bytes = blob.len(), "Tile served from offline store");
                Ok(TileSource::Cached { key, blob })
            }
            None => {
                debug!(%coord, url = %url, "Tile not stored, using network");
                Ok(TileSource::Network(url))
            }
        }
    }
}
