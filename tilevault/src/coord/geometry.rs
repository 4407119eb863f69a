//! Map geometry capability.
//!
//! The offline core never does projection math itself. It asks a
//! [`MapGeometry`] to turn geographic bounds into a pixel rectangle at a
//! given zoom, which keeps the enumerator independent of the map's CRS.

use std::f64::consts::PI;

use super::types::{LatLng, LatLngBounds, PixelBounds, PixelPoint, MAX_LAT, MIN_LAT};

/// Projects geographic coordinates into pixel space.
pub trait MapGeometry: Send + Sync {
    /// Projects a single position at the given zoom.
    fn project(&self, position: &LatLng, zoom: u8) -> PixelPoint;

    /// Projects a bounding box at the given zoom using its NW and SE corners.
    fn project_bounds(&self, bounds: &LatLngBounds, zoom: u8) -> PixelBounds {
        PixelBounds::new(
            self.project(&bounds.north_west(), zoom),
            self.project(&bounds.south_east(), zoom),
        )
    }
}

/// Spherical Web Mercator (EPSG:3857) projection.
#[derive(Debug, Clone, Copy)]
pub struct WebMercator {
    tile_size: u32,
}

impl WebMercator {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// World width in pixels at the given zoom.
    #[inline]
    fn scale(&self, zoom: u8) -> f64 {
        f64::from(self.tile_size) * 2.0_f64.powi(i32::from(zoom))
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new(256)
    }
}

impl MapGeometry for WebMercator {
    fn project(&self, position: &LatLng, zoom: u8) -> PixelPoint {
        let scale = self.scale(zoom);
        let lat = position.lat.clamp(MIN_LAT, MAX_LAT);

        let x = (position.lng + 180.0) / 360.0 * scale;

        let lat_rad = lat * PI / 180.0;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * scale;

        PixelPoint::new(x, y)
    }
}
