//! Core traits for tile storage.
//!
//! The `TileStore` trait is the key-value contract the offline cache persists
//! into. Keys are canonical tile keys (see [`crate::tile::key`]); values are
//! [`TileBlob`]s.
//!
//! # Design Principles
//!
//! - **String keys**: human-readable, identical to the canonical tile URL
//! - **Opaque blobs**: the store never inspects image data
//! - **Dyn-compatible**: `Pin<Box<dyn Future>>` so callers hold `Arc<dyn TileStore>`
//! - **No eviction**: entries disappear only through `remove` or `clear`

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content type used when a response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors that can occur during store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// I/O error in a file-backed store.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// A persisted entry could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(Arc::new(e))
    }
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A tile image payload and its content type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBlob {
    data: Bytes,
    content_type: String,
}

impl TileBlob {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Debug for TileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileBlob")
            .field("len", &self.data.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Key-value storage for tile blobs.
///
/// # Consistency
///
/// `set` replaces the whole value for a key; implementations must never let a
/// `get` observe a partially written blob. While a key is being rewritten a
/// `get` may return `None`.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
pub trait TileStore: Send + Sync {
    /// Retrieve a blob by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(blob))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if the lookup itself failed
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<TileBlob>, StoreError>>;

    /// Store a blob under the given key, replacing any existing value.
    fn set(&self, key: &str, blob: TileBlob) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Delete a blob by key.
    ///
    /// Returns `Ok(true)` if the key existed.
    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Delete every entry.
    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Number of stored entries.
    fn size(&self) -> BoxFuture<'_, Result<usize, StoreError>>;
}
