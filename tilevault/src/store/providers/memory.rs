//! In-memory tile store.
//!
//! Backed by a `DashMap` so concurrent tasks can read and write different
//! keys without contending on a single lock. Entries are never evicted; the
//! store grows until `remove` or `clear` is called.

use dashmap::DashMap;

use crate::store::traits::{BoxFuture, StoreError, TileBlob, TileStore};

/// In-memory tile store.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    entries: DashMap<String, TileBlob>,
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TileStore for MemoryTileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<TileBlob>, StoreError>> {
        let found = self.entries.get(key).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn set(&self, key: &str, blob: TileBlob) -> BoxFuture<'_, Result<(), StoreError>> {
        let key = key.to_string();
        Box::pin(async move {
            self.entries.insert(key, blob);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.entries.remove(&key).is_some()) })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.entries.clear();
            Ok(())
        })
    }

    fn size(&self) -> BoxFuture<'_, Result<usize, StoreError>> {
        Box::pin(async move { Ok(self.entries.len()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(bytes: &[u8]) -> TileBlob {
        TileBlob::new(bytes.to_vec(), "image/png")
    }

    #[tokio::test]
    async fn test_memory_store_set_and_get() {
        let store = MemoryTileStore::new();
        store.set("k1", blob(&[1, 2, 3])).await.unwrap();

        let value = store.get("k1").await.unwrap();
        assert_eq!(value, Some(blob(&[1, 2, 3])));
    }

    #[tokio::test]
    async fn test_memory_store_get_missing() {
        let store = MemoryTileStore::new();
        assert!(store.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_remove() {
        let store = MemoryTileStore::new();
        store.set("k1", blob(&[1])).await.unwrap();

        assert!(store.remove("k1").await.unwrap());
        assert!(!store.remove("k1").await.unwrap());
        assert!(store.get("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_size_and_clear() {
        let store = MemoryTileStore::new();
        store.set("a", blob(&[1, 2])).await.unwrap();
        store.set("b", blob(&[3])).await.unwrap();
        store.set("a", blob(&[4, 5, 6])).await.unwrap();

        assert_eq!(store.size().await.unwrap(), 2);
        assert_eq!(store.get("a").await.unwrap().unwrap().len(), 3);

        store.clear().await.unwrap();
        assert_eq!(store.size().await.unwrap(), 0);
        assert!(store.get("b").await.unwrap().is_none());
    }
}
