//! Durable favorites collection, at most one record per breed.
//!
//! # Design
//! The whole collection is one JSON array stored under `FAVORITES_KEY`. Every
//! mutation loads it, edits it in memory, and writes it back as a unit. An
//! async mutex is held across that read-modify-write so concurrent callers
//! cannot lose each other's updates; reads take the same lock because a read
//! of a corrupt blob resets storage.
//!
//! A blob that fails to decode is logged, removed, and treated as empty so the
//! store heals itself instead of failing on every read.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::storage::BlobStorage;
use crate::types::FavoriteRecord;

pub const FAVORITES_KEY: &str = "cat_favorites";

pub struct FavoritesStore {
    storage: Arc<dyn BlobStorage>,
    lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn BlobStorage>) -> Self {
        Self {
            storage,
            lock: Mutex::new(()),
        }
    }

    /// Every stored record, in storage order. Read failures yield an empty
    /// list.
    pub async fn list(&self) -> Vec<FavoriteRecord> {
        let _guard = self.lock.lock().await;
        self.load().await.unwrap_or_else(|e| {
            warn!(error = %e, "favorites read failed");
            Vec::new()
        })
    }

    /// Every stored record, most recently favorited first.
    pub async fn list_recent(&self) -> Vec<FavoriteRecord> {
        let mut records = self.list().await;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// Insert `record`, replacing any existing record for the same breed.
    pub async fn add(&self, record: FavoriteRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        records.retain(|r| r.breed_id != record.breed_id);
        debug!(breed_id = %record.breed_id, image_id = %record.image_id, "favorite added");
        records.push(record);
        self.persist(&records).await
    }

    /// Remove the record for `breed_id`. Returns `false` when there was none,
    /// in which case storage is left untouched.
    pub async fn remove(&self, breed_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let Some(index) = records.iter().position(|r| r.breed_id == breed_id) else {
            return Ok(false);
        };
        records.remove(index);
        self.persist(&records).await?;
        debug!(breed_id, "favorite removed");
        Ok(true)
    }

    pub async fn contains(&self, breed_id: &str) -> bool {
        self.list().await.iter().any(|r| r.breed_id == breed_id)
    }

    /// Drop every stored favorite.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.storage.remove(FAVORITES_KEY).await?;
        Ok(())
    }

    /// Caller must hold `lock`.
    async fn load(&self) -> Result<Vec<FavoriteRecord>, StoreError> {
        let Some(bytes) = self.storage.read(FAVORITES_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, bytes = bytes.len(), "favorites blob is corrupt, resetting");
                self.storage.remove(FAVORITES_KEY).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Caller must hold `lock`.
    async fn persist(&self, records: &[FavoriteRecord]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records)?;
        self.storage.write(FAVORITES_KEY, &bytes).await?;
        Ok(())
    }
}
