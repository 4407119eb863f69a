//! Tile addressing
//!
//! URL templates, canonical cache keys and the enumeration of every tile
//! needed to cover a bounding box.
//!
//! ```text
//! LatLngBounds ──► MapGeometry ──► PixelBounds ──► enumerate() ──► Vec<TileRequest>
//!                                                      │
//!                                  TileUrlTemplate ────┘ (url + key per tile)
//! ```

mod enumerate;
pub mod key;
mod request;
mod template;

pub use enumerate::{count, count_range, enumerate, enumerate_range};
pub use key::{resolve_key, KeyResolver};
pub use request::TileRequest;
pub use template::{TemplateError, TemplateOptions, TileUrlTemplate};
