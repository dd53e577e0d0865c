//! Key-value blob storage backing the favorites store.
//!
//! # Design
//! A blob is read and written wholesale; there is no partial update. The file
//! backend writes to a uniquely named sibling temp file, syncs it to disk, and
//! renames it over the target, so neither a reader nor a crash ever leaves a
//! half-written blob in place.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    async fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    async fn write(&self, key: &str, data: &[u8]) -> io::Result<()>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> io::Result<()>;
}

/// One file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileBlobStorage {
    dir: PathBuf,
}

impl FileBlobStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Random sibling of `path_for(key)`; concurrent writers never share one.
    fn temp_path_for(&self, key: &str) -> PathBuf {
        let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(10)
            .collect();
        self.dir.join(format!(".{key}.json.{suffix}.tmp"))
    }

    async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl BlobStorage for FileBlobStorage {
    async fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, key: &str, data: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let target = self.path_for(key);
        let temp = self.temp_path_for(key);
        let written = match Self::write_synced(&temp, data).await {
            Ok(()) => fs::rename(&temp, &target).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            let _ = fs::remove_file(&temp).await;
        }
        written
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Process-local storage; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryBlobStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    async fn write(&self, key: &str, data: &[u8]) -> io::Result<()> {
        self.blobs.lock().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        self.blobs.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path().join("nested"));

        assert!(storage.read("k").await.unwrap().is_none());
        storage.write("k", b"[1,2]").await.unwrap();
        assert_eq!(storage.read("k").await.unwrap().as_deref(), Some(&b"[1,2]"[..]));

        storage.write("k", b"[]").await.unwrap();
        assert_eq!(storage.read("k").await.unwrap().as_deref(), Some(&b"[]"[..]));
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn file_storage_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path());

        storage.write("k", b"one").await.unwrap();
        storage.write("k", b"two").await.unwrap();
        assert_eq!(file_names(dir.path()), vec!["k.json"]);
    }

    #[test]
    fn temp_paths_are_unique_per_write() {
        let storage = FileBlobStorage::new("/data");
        let a = storage.temp_path_for("k");
        let b = storage.temp_path_for("k");
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/data")));
        assert_ne!(a, storage.path_for("k"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_one_directory_never_tear() {
        let dir = tempfile::tempdir().unwrap();
        let payloads: Vec<Vec<u8>> = (0..16u8).map(|i| vec![b'a' + i; 4096]).collect();

        let tasks: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|data| {
                let storage = FileBlobStorage::new(dir.path());
                tokio::spawn(async move { storage.write("k", &data).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = FileBlobStorage::new(dir.path()).read("k").await.unwrap().unwrap();
        assert!(payloads.contains(&stored));
        assert_eq!(file_names(dir.path()), vec!["k.json"]);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_blob() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path());
        storage.write("k", b"kept").await.unwrap();

        // A directory squatting on the target makes the rename fail.
        std::fs::create_dir(dir.path().join("other.json")).unwrap();
        std::fs::write(dir.path().join("other.json").join("x"), b"").unwrap();
        assert!(storage.write("other", b"lost").await.is_err());

        assert_eq!(storage.read("k").await.unwrap().as_deref(), Some(&b"kept"[..]));
        let names = file_names(dir.path());
        assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{names:?}");
    }

    #[tokio::test]
    async fn file_storage_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBlobStorage::new(dir.path());

        storage.remove("k").await.unwrap();
        storage.write("k", b"x").await.unwrap();
        storage.remove("k").await.unwrap();
        assert!(storage.read("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_storage_round_trip() {
        let storage = MemoryBlobStorage::new();
        storage.write("k", b"v").await.unwrap();
        assert_eq!(storage.read("k").await.unwrap(), Some(b"v".to_vec()));
        storage.remove("k").await.unwrap();
        assert!(storage.read("k").await.unwrap().is_none());
    }
}
