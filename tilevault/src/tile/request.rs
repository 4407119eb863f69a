//! Tile fetch request type.

use std::fmt;

use crate::coord::TileCoord;

/// One tile to fetch and persist.
///
/// `url` is the fully substituted fetch address; `key` is the canonical
/// storage identifier, identical for every subdomain variant of the URL.
///
/// # Example
///
/// ```
/// use tilevault::coord::TileCoord;
/// use tilevault::tile::TileRequest;
///
/// let request = TileRequest::new(
///     TileCoord::new(4, 5, 13),
///     "https://a.tile.example/13/4/5.png",
///     "https://b.tile.example/13/4/5.png",
/// );
/// assert_eq!(request.coord().z, 13);
/// assert_eq!(request.key(), "https://a.tile.example/13/4/5.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileRequest {
    coord: TileCoord,
    key: String,
    url: String,
}

impl TileRequest {
    pub fn new(coord: TileCoord, key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            coord,
            key: key.into(),
            url: url.into(),
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Canonical cache key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fetch URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for TileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.coord, self.url)
    }
}
