//! Tile store implementations.
//!
//! # Available Providers
//!
//! - [`MemoryTileStore`]: in-process map, used by tests and short-lived sessions
//! - [`DiskTileStore`]: one file per tile under a cache directory

mod disk;
mod memory;

pub use disk::DiskTileStore;
pub use memory::MemoryTileStore;
