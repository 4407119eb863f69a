//! Tile storage
//!
//! The offline cache persists tiles through the [`TileStore`] trait and never
//! depends on a concrete backend. Two providers ship with the crate, and
//! [`GuardedStore`] wraps any of them with the per-key write serialization the
//! save path relies on.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ TileFetcher / OfflineController / Resolver   │
//! └──────────────────────┬───────────────────────┘
//!                        │ get / replace / clear_all / size
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │ GuardedStore (per-key Mutex + clear RwLock)  │
//! └──────────────────────┬───────────────────────┘
//!                        │ Arc<dyn TileStore>
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │ MemoryTileStore │ DiskTileStore │ your own   │
//! └──────────────────────────────────────────────┘
//! ```

mod guarded;
mod providers;
mod traits;

pub use guarded::GuardedStore;
pub use providers::{DiskTileStore, MemoryTileStore};
pub use traits::{BoxFuture, StoreError, TileBlob, TileStore, DEFAULT_CONTENT_TYPE};
