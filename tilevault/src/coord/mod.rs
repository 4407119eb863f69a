//! Coordinate types and projection
//!
//! Tile coordinates, geographic bounds and the pixel-space rectangles the
//! enumerator works with, plus the [`MapGeometry`] capability that connects
//! them.

mod geometry;
mod types;

pub use geometry::{MapGeometry, WebMercator};
pub use types::{
    CoordError, LatLng, LatLngBounds, PixelBounds, PixelPoint, TileCoord, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON,
};

/// Returns the tile containing a geographic position at the given zoom.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (clamped to the Web Mercator range)
/// * `lng` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to [`MAX_ZOOM`])
#[inline]
pub fn tile_at(lat: f64, lng: f64, zoom: u8, tile_size: u32) -> Result<TileCoord, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    let position = LatLng::new(lat, lng)?;
    let point = WebMercator::new(tile_size).project(&position, zoom);
    let size = f64::from(tile_size.max(1));

    Ok(TileCoord {
        x: (point.x / size).floor() as i64,
        y: (point.y / size).floor() as i64,
        z: zoom,
    })
}
