//! TileVault - offline tile cache for slippy-map tile layers
//!
//! This library saves the tiles covering a map view, from the current zoom
//! down to a maximum zoom, into a pluggable store, and later serves them in
//! place of network requests.
//!
//! # Modules
//!
//! - [`coord`] - tile coordinates, bounds and map projection
//! - [`tile`] - URL templates, canonical cache keys and tile enumeration
//! - [`store`] - the `TileStore` trait, memory and disk providers, write guards
//! - [`fetch`] - HTTP client and concurrent fetch-and-store
//! - [`controller`] - save/remove orchestration with lifecycle events
//! - [`resolver`] - cache-first tile source lookup
//! - [`config`] - offline configuration and the INI config file
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod controller;
pub mod coord;
pub mod fetch;
pub mod logging;
pub mod resolver;
pub mod store;
pub mod tile;
