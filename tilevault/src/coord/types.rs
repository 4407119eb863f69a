//! Coordinate value types.

use std::fmt;

use thiserror::Error;

/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.051_128_779_8;
/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -MAX_LAT;
/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;
/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;
/// Highest zoom level accepted anywhere in the crate.
pub const MAX_ZOOM: u8 = 30;

/// Errors from coordinate construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    #[error("invalid zoom level: {0} (max {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// North edge lies south of the south edge.
    #[error("inverted bounds: north {north} is below south {south}")]
    InvertedBounds { north: f64, south: f64 },
}

/// A tile in the quad-tree tiling scheme.
///
/// `x` grows eastward and `y` grows southward. Both are signed because a
/// projected viewport can extend past the grid edge and the enumerator does
/// not clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: i64, y: i64, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along one axis at this tile's zoom.
    ///
    /// Saturates at `i64::MAX` for zooms whose grid does not fit in an `i64`.
    #[inline]
    pub fn grid_size(&self) -> i64 {
        1_i64
            .checked_shl(u32::from(self.z))
            .filter(|size| *size > 0)
            .unwrap_or(i64::MAX)
    }

    /// Y index counted from the bottom of the grid (TMS convention).
    #[inline]
    pub fn inverted_y(&self) -> i64 {
        self.grid_size().saturating_sub(1).saturating_sub(self.y)
    }

    /// Fails when the zoom is beyond [`MAX_ZOOM`].
    pub fn validate(&self) -> Result<(), CoordError> {
        if self.z > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(self.z));
        }
        Ok(())
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a validated position.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordError> {
        if !(-90.0..=90.0).contains(&lat) || lat.is_nan() {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&lng) || lng.is_nan() {
            return Err(CoordError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }
}

/// Geographic bounding box given by its north-west and south-east corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    north_west: LatLng,
    south_east: LatLng,
}

impl LatLngBounds {
    /// Creates bounds from the four edges.
    pub fn from_edges(north: f64, west: f64, south: f64, east: f64) -> Result<Self, CoordError> {
        let north_west = LatLng::new(north, west)?;
        let south_east = LatLng::new(south, east)?;
        if north < south {
            return Err(CoordError::InvertedBounds { north, south });
        }
        Ok(Self {
            north_west,
            south_east,
        })
    }

    pub fn north_west(&self) -> LatLng {
        self.north_west
    }

    pub fn south_east(&self) -> LatLng {
        self.south_east
    }
}

/// A point in projected pixel space at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in projected pixel space.
///
/// The constructor normalizes the corners so `min` is always the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBounds {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

impl PixelBounds {
    pub fn new(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            min: PixelPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: PixelPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Tile index rectangle covering these bounds, inclusive on both corners.
    ///
    /// Returns `((min_x, min_y), (max_x, max_y))`.
    pub fn tile_range(&self, tile_size: u32) -> ((i64, i64), (i64, i64)) {
        let size = f64::from(tile_size.max(1));
        (
            (
                (self.min.x / size).floor() as i64,
                (self.min.y / size).floor() as i64,
            ),
            (
                (self.max.x / size).floor() as i64,
                (self.max.y / size).floor() as i64,
            ),
        )
    }
}
