//! Tile download and persistence.
//!
//! This module provides functionality for saving tiles for offline use:
//! - HTTP access behind a mockable trait (`http`)
//! - Per-session progress and failure tracking (`session`)
//! - Concurrent fetch-and-store with per-tile outcomes (`orchestrator`)
//!
//! # Architecture
//!
//! ```text
//! TileFetcher (orchestrator)
//!         │
//!         ├── AsyncHttpClient (trait)
//!         │       └── ReqwestClient
//!         │
//!         ├── GuardedStore (remove-then-set per key)
//!         │
//!         └── SaveSession → SaveReport
//! ```

mod http;
mod orchestrator;
mod session;

pub use http::{AsyncHttpClient, FetchError, ReqwestClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use orchestrator::{TileError, TileFetcher, TileOutcome};
pub use session::{SaveReport, SaveSession, TileFailure};

#[cfg(test)]
pub use http::tests::MockHttpClient;
