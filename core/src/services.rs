//! Composition root: builds the catalog, favorites store, and image cache
//! from one `Config` and hands them to the host as explicit instances.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::info;

use crate::catalog::BreedCatalog;
use crate::client::CatApiClient;
use crate::config::Config;
use crate::error::ConfigError;
use crate::favorites::FavoritesStore;
use crate::http::{ReqwestTransport, Transport};
use crate::image_cache::ImageCache;
use crate::storage::{BlobStorage, FileBlobStorage};

pub struct Services {
    pub catalog: BreedCatalog,
    pub favorites: FavoritesStore,
    pub images: ImageCache,
}

impl Services {
    /// Production wiring: reqwest transport and file-backed favorites under
    /// `config.favorites_dir`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let storage = Arc::new(FileBlobStorage::new(&config.favorites_dir));
        info!(
            base_url = %config.base_url,
            favorites_dir = %config.favorites_dir.display(),
            "services configured"
        );
        Self::new(config, Arc::new(ReqwestTransport::new()), storage)
    }

    /// Wire the services over caller-supplied transport and storage.
    pub fn new(
        config: &Config,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn BlobStorage>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.image_cache_capacity).ok_or_else(|| {
            ConfigError::Validation("image_cache_capacity must be greater than 0".to_string())
        })?;

        let client = CatApiClient::new(&config.base_url, &config.api_key, Arc::clone(&transport));
        Ok(Self {
            catalog: BreedCatalog::with_image_limit(client, config.image_limit),
            favorites: FavoritesStore::new(storage),
            images: ImageCache::new(transport, capacity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStorage;

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            image_limit: 0,
            ..Config::default()
        };
        let result = Services::new(
            &config,
            Arc::new(ReqwestTransport::new()),
            Arc::new(MemoryBlobStorage::new()),
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn capacity_flows_into_image_cache() {
        let config = Config {
            image_cache_capacity: 7,
            ..Config::default()
        };
        let services = Services::new(
            &config,
            Arc::new(ReqwestTransport::new()),
            Arc::new(MemoryBlobStorage::new()),
        )
        .unwrap();
        assert_eq!(services.images.capacity(), 7);
        assert!(services.images.is_empty());
    }
}
