//! Write serialization around a shared tile store.
//!
//! The save path rewrites a key as remove-then-set. On a multi-threaded
//! runtime two saves of the same key, or a save racing a clear, could
//! interleave those steps. `GuardedStore` adds the mutual exclusion:
//!
//! - a per-key async mutex held across remove-then-set
//! - a store-wide `RwLock`, shared by replaces and exclusive for `clear`
//!
//! Reads take no lock. A read during a replace sees the old blob or nothing,
//! never a partial one.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

use super::traits::{BoxFuture, StoreError, TileBlob, TileStore};

/// A [`TileStore`] wrapper that serializes writers per key.
pub struct GuardedStore {
    inner: Arc<dyn TileStore>,
    key_locks: DashMap<String, Arc<Mutex<()>>>,
    clear_lock: RwLock<()>,
}

impl GuardedStore {
    pub fn new(inner: Arc<dyn TileStore>) -> Self {
        Self {
            inner,
            key_locks: DashMap::new(),
            clear_lock: RwLock::new(()),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &Arc<dyn TileStore> {
        &self.inner
    }

    /// Replaces the blob for `key`: remove first, then set.
    pub async fn replace(&self, key: &str, blob: TileBlob) -> Result<(), StoreError> {
        let _shared = self.clear_lock.read().await;
        let lock = self.key_lock(key);
        let result = {
            let _exclusive = lock.lock().await;
            match self.inner.remove(key).await {
                Ok(_) => self.inner.set(key, blob).await,
                Err(e) => Err(e),
            }
        };
        drop(lock);
        self.release_key_lock(key);
        result
    }

    /// Clears the wrapped store once no replace is in progress.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let _exclusive = self.clear_lock.write().await;
        self.inner.clear().await
    }

    /// Number of keys with an in-flight replace.
    pub fn pending_writes(&self) -> usize {
        self.key_locks.len()
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.key_locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    fn release_key_lock(&self, key: &str) {
        // Only the map still holds it: nobody else is waiting on this key.
        self.key_locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl TileStore for GuardedStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<TileBlob>, StoreError>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, blob: TileBlob) -> BoxFuture<'_, Result<(), StoreError>> {
        let key = key.to_string();
        Box::pin(async move { self.replace(&key, blob).await })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let key = key.to_string();
        Box::pin(async move {
            let _shared = self.clear_lock.read().await;
            let lock = self.key_lock(&key);
            let result = {
                let _exclusive = lock.lock().await;
                self.inner.remove(&key).await
            };
            drop(lock);
            self.release_key_lock(&key);
            result
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(self.clear_all())
    }

    fn size(&self) -> BoxFuture<'_, Result<usize, StoreError>> {
        self.inner.size()
    }
}
