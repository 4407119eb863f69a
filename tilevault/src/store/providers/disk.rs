//! On-disk tile store.
//!
//! Each entry is one file in the store directory. The file name is the hex
//! SHA-256 of the key, so arbitrary URLs map to safe, fixed-length names.
//! File content is a `bincode`-encoded record holding the original key, the
//! content type and the payload.
//!
//! Writes go to a temporary file that is renamed into place, so a reader sees
//! either the previous file, no file, or the complete new file. Temporary
//! names carry the process id and a process-wide sequence number, so stores
//! in different processes or tasks sharing a directory never write to the
//! same temporary file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use crate::store::traits::{BoxFuture, StoreError, TileBlob, TileStore};

/// Extension of committed entry files.
const ENTRY_EXTENSION: &str = "tile";
/// Extension of in-flight temporary files.
const TEMP_EXTENSION: &str = "partial";

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Serialize, Deserialize)]
struct StoredTile {
    key: String,
    content_type: String,
    data: Vec<u8>,
}

/// On-disk tile store rooted at a directory.
#[derive(Debug)]
pub struct DiskTileStore {
    directory: PathBuf,
}

impl DiskTileStore {
    /// Opens (creating if needed) a store in `directory`.
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).await?;
        debug!(path = %directory.display(), "Opened disk tile store");
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        let name: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        self.directory.join(format!("{}.{}", name, ENTRY_EXTENSION))
    }

    fn temp_path(&self, entry: &Path) -> PathBuf {
        let n = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        entry.with_extension(format!("{}-{}.{}", std::process::id(), n, TEMP_EXTENSION))
    }

    /// Total bytes of the committed entry files.
    pub async fn disk_usage(&self) -> Result<u64, StoreError> {
        let mut total = 0;
        for (path, committed) in self.owned_files().await? {
            if !committed {
                continue;
            }
            match fs::metadata(&path).await {
                Ok(meta) => total += meta.len(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    async fn read_entry(&self, key: &str) -> Result<Option<TileBlob>, StoreError> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredTile =
            bincode::deserialize(&bytes).map_err(|e| StoreError::Encoding(e.to_string()))?;
        if stored.key != key {
            warn!(key, stored = %stored.key, "Disk entry key mismatch, treating as absent");
            return Ok(None);
        }
        Ok(Some(TileBlob::new(stored.data, stored.content_type)))
    }

    async fn write_entry(&self, key: &str, blob: TileBlob) -> Result<(), StoreError> {
        let stored = StoredTile {
            key: key.to_string(),
            content_type: blob.content_type().to_string(),
            data: blob.into_data().to_vec(),
        };
        let bytes = bincode::serialize(&stored).map_err(|e| StoreError::Encoding(e.to_string()))?;

        let path = self.entry_path(key);
        let temp = self.temp_path(&path);
        if let Err(e) = fs::write(&temp, &bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_entry(&self, key: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Visits every file this store owns, committed or temporary.
    async fn owned_files(&self) -> Result<Vec<(PathBuf, bool)>, StoreError> {
        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.directory).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if ext == ENTRY_EXTENSION {
                files.push((path, true));
            } else if ext == TEMP_EXTENSION {
                files.push((path, false));
            }
        }
        Ok(files)
    }

    async fn clear_entries(&self) -> Result<(), StoreError> {
        let files = self.owned_files().await?;
        let count = files.len();
        for (path, _) in files {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!(path = %self.directory.display(), files = count, "Cleared disk tile store");
        Ok(())
    }

    async fn count_entries(&self) -> Result<usize, StoreError> {
        let files = self.owned_files().await?;
        Ok(files.iter().filter(|(_, committed)| *committed).count())
    }
}

impl TileStore for DiskTileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<TileBlob>, StoreError>> {
        let key = key.to_string();
        Box::pin(async move { self.read_entry(&key).await })
    }

    fn set(&self, key: &str, blob: TileBlob) -> BoxFuture<'_, Result<(), StoreError>> {
        let key = key.to_string();
        Box::pin(async move { self.write_entry(&key, blob).await })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let key = key.to_string();
        Box::pin(async move { self.remove_entry(&key).await })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(self.clear_entries())
    }

    fn size(&self) -> BoxFuture<'_, Result<usize, StoreError>> {
        Box::pin(self.count_entries())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tempfile::TempDir;

    const KEY: &str = "https://a.tile.openstreetmap.org/13/4/5.png";

    async fn open_temp() -> (TempDir, DiskTileStore) {
        let dir = TempDir::new().unwrap();
        let store = DiskTileStore::open(dir.path().join("tiles")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_disk_store_roundtrip_preserves_content_type() {
        let (_dir, store) = open_temp().await;
        store
            .set(KEY, TileBlob::new(vec![9, 8, 7], "image/jpeg"))
            .await
            .unwrap();

        let blob = store.get(KEY).await.unwrap().unwrap();
        assert_eq!(blob.data().as_ref(), &[9, 8, 7]);
        assert_eq!(blob.content_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_disk_store_missing_key() {
        let (_dir, store) = open_temp().await;
        assert!(store.get(KEY).await.unwrap().is_none());
        assert!(!store.remove(KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_disk_store_overwrite_leaves_one_file() {
        let (_dir, store) = open_temp().await;
        store.set(KEY, TileBlob::new(vec![1], "image/png")).await.unwrap();
        store.set(KEY, TileBlob::new(vec![2], "image/png")).await.unwrap();

        assert_eq!(store.size().await.unwrap(), 1);
        let blob = store.get(KEY).await.unwrap().unwrap();
        assert_eq!(blob.data().as_ref(), &[2]);
    }

    #[tokio::test]
    async fn test_disk_store_clear_ignores_foreign_files() {
        let (_dir, store) = open_temp().await;
        store.set("a", TileBlob::new(vec![1], "image/png")).await.unwrap();
        store.set("b", TileBlob::new(vec![2], "image/png")).await.unwrap();
        std::fs::write(store.directory().join("README"), b"keep me").unwrap();
        std::fs::write(store.directory().join("stale.3.partial"), b"x").unwrap();

        assert_eq!(store.size().await.unwrap(), 2);
        store.clear().await.unwrap();

        assert_eq!(store.size().await.unwrap(), 0);
        assert!(store.directory().join("README").exists());
        assert!(!store.directory().join("stale.3.partial").exists());
    }

    #[tokio::test]
    async fn test_temp_paths_are_unique_across_instances() {
        let dir = TempDir::new().unwrap();
        let first = DiskTileStore::open(dir.path()).await.unwrap();
        let second = DiskTileStore::open(dir.path()).await.unwrap();

        let entry = first.entry_path(KEY);
        let a = first.temp_path(&entry);
        let b = second.temp_path(&entry);
        assert_ne!(a, b);
        assert!(a
            .to_string_lossy()
            .contains(&format!(".{}-", std::process::id())));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some(TEMP_EXTENSION));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_stores_writing_one_key_leave_a_whole_entry() {
        let dir = TempDir::new().unwrap();
        let first = Arc::new(DiskTileStore::open(dir.path()).await.unwrap());
        let second = Arc::new(DiskTileStore::open(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for round in 0..20u8 {
            for (store, fill) in [(first.clone(), 1u8), (second.clone(), 2u8)] {
                handles.push(tokio::spawn(async move {
                    let payload = vec![fill; 64 * 1024 + usize::from(round)];
                    store.set(KEY, TileBlob::new(payload, "image/png")).await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let blob = first.get(KEY).await.unwrap().unwrap();
        let fill = blob.data()[0];
        assert!(blob.data().iter().all(|b| *b == fill));
        assert_eq!(first.size().await.unwrap(), 1);
        let leftovers = first
            .owned_files()
            .await
            .unwrap()
            .into_iter()
            .filter(|(_, committed)| !committed)
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_disk_usage_counts_only_entries() {
        let (_dir, store) = open_temp().await;
        store.set("a", TileBlob::new(vec![1; 100], "image/png")).await.unwrap();
        std::fs::write(store.directory().join("README"), [0u8; 1000]).unwrap();
        std::fs::write(store.directory().join("x.1-2.partial"), [0u8; 1000]).unwrap();

        let usage = store.disk_usage().await.unwrap();
        assert!(usage >= 100);
        assert!(usage < 1000);
    }

    #[tokio::test]
    async fn test_disk_store_corrupt_entry_is_an_error() {
        let (_dir, store) = open_temp().await;
        std::fs::write(store.entry_path(KEY), b"not bincode").unwrap();

        let result = store.get(KEY).await;
        assert!(matches!(result, Err(StoreError::Encoding(_))));
    }
}
