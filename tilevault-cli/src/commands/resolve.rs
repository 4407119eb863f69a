//! `tilevault resolve` - show where a tile would be loaded from.

use clap::Args;
use tilevault::coord::{tile_at, TileCoord};
use tilevault::resolver::OfflineTileResolver;

use super::common::{load_config, open_store};
use crate::error::CliError;

/// Arguments for `resolve`. The tile is given either by index or by a
/// position inside it.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Tile column
    #[arg(long, allow_hyphen_values = true, requires = "y", conflicts_with_all = ["lat", "lng"])]
    pub x: Option<i64>,

    /// Tile row
    #[arg(long, allow_hyphen_values = true, requires = "x")]
    pub y: Option<i64>,

    /// Latitude of a point inside the tile
    #[arg(long, allow_hyphen_values = true, requires = "lng", conflicts_with_all = ["x", "y"])]
    pub lat: Option<f64>,

    /// Longitude of a point inside the tile
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Zoom level
    #[arg(long)]
    pub z: u8,
}

impl ResolveArgs {
    fn coord(&self, tile_size: u32) -> Result<TileCoord, CliError> {
        match (self.x, self.y, self.lat, self.lng) {
            (Some(x), Some(y), _, _) => Ok(TileCoord::new(x, y, self.z)),
            (_, _, Some(lat), Some(lng)) => Ok(tile_at(lat, lng, self.z, tile_size)?),
            _ => Err(CliError::InvalidArgument(
                "give either --x and --y, or --lat and --lng".to_string(),
            )),
        }
    }
}

/// Print `cached (...)` or the network URL for the requested tile.
pub async fn run(args: ResolveArgs) -> Result<(), CliError> {
    let file = load_config()?;
    let config = file.to_offline_config()?;
    let coord = args.coord(config.tile_size)?;
    let template = config.template()?;
    let store = open_store(&file).await?;

    let resolver = OfflineTileResolver::new(template, store);
    let source = resolver.resolve_tile_source(coord).await?;
    println!("{}", source);
    Ok(())
}
