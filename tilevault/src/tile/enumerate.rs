//! Tile set enumeration.
//!
//! Turns a projected bounding box into the list of tiles that cover it.

use std::ops::RangeInclusive;

use tracing::debug;

use super::request::TileRequest;
use super::template::TileUrlTemplate;
use crate::coord::{LatLngBounds, MapGeometry, PixelBounds, TileCoord};

/// Enumerates the tiles covering `bounds` at a single zoom level.
///
/// The tile index rectangle is `floor(bounds / tile_size)`, inclusive on both
/// corners. Tiles are produced column by column (x outer, y inner).
///
/// # Arguments
///
/// * `bounds` - Bounding box already projected to pixel space at `zoom`
/// * `zoom` - Zoom level of the projection
/// * `tile_size` - Tile edge length in pixels
/// * `template` - URL template used to build each tile's URL and key
pub fn enumerate(
    bounds: &PixelBounds,
    zoom: u8,
    tile_size: u32,
    template: &TileUrlTemplate,
) -> Vec<TileRequest> {
    let ((min_x, min_y), (max_x, max_y)) = bounds.tile_range(tile_size);

    let capacity = count(bounds, tile_size).unwrap_or(0);
    let mut tiles = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));

    for x in min_x..=max_x {
        for y in min_y..=max_y {
            tiles.push(template.request_for(TileCoord::new(x, y, zoom)));
        }
    }

    debug!(zoom, count = tiles.len(), "Enumerated tiles");
    tiles
}

/// Number of tiles [`enumerate`] would produce for `bounds`, without building
/// them. `None` when the count does not fit in a `u64`.
pub fn count(bounds: &PixelBounds, tile_size: u32) -> Option<u64> {
    let ((min_x, min_y), (max_x, max_y)) = bounds.tile_range(tile_size);
    let span = |min: i64, max: i64| -> Option<u64> {
        let diff = i128::from(max) - i128::from(min) + 1;
        u64::try_from(diff.max(0)).ok()
    };
    span(min_x, max_x)?.checked_mul(span(min_y, max_y)?)
}

/// Number of tiles [`enumerate_range`] would produce, summed over every zoom.
///
/// Nothing is allocated per tile, so this is safe to call on ranges far too
/// large to enumerate. `None` when the total does not fit in a `u64`.
pub fn count_range(
    bounds: &LatLngBounds,
    mut zooms: RangeInclusive<u8>,
    tile_size: u32,
    geometry: &dyn MapGeometry,
) -> Option<u64> {
    zooms.try_fold(0u64, |total, zoom| {
        let projected = geometry.project_bounds(bounds, zoom);
        total.checked_add(count(&projected, tile_size)?)
    })
}

/// Enumerates tiles for every zoom in `zooms`, projecting `bounds` per level.
///
/// Results are concatenated in ascending zoom order. An empty range yields
/// an empty list.
pub fn enumerate_range(
    bounds: &LatLngBounds,
    zooms: RangeInclusive<u8>,
    tile_size: u32,
    geometry: &dyn MapGeometry,
    template: &TileUrlTemplate,
) -> Vec<TileRequest> {
    zooms
        .flat_map(|zoom| {
            let projected = geometry.project_bounds(bounds, zoom);
            enumerate(&projected, zoom, tile_size, template)
        })
        .collect()
}
