//! Breed catalog: typed wrappers over `CatApiClient`.
//!
//! Errors pass through from the client unchanged. There is no caching or
//! pagination here; images are capped by a fixed limit per request.

use crate::client::CatApiClient;
use crate::config::DEFAULT_IMAGE_LIMIT;
use crate::error::ApiError;
use crate::types::{Breed, CatImage};

#[derive(Clone)]
pub struct BreedCatalog {
    client: CatApiClient,
    image_limit: u32,
}

impl BreedCatalog {
    pub fn new(client: CatApiClient) -> Self {
        Self::with_image_limit(client, DEFAULT_IMAGE_LIMIT)
    }

    pub fn with_image_limit(client: CatApiClient, image_limit: u32) -> Self {
        Self {
            client,
            image_limit,
        }
    }

    /// `GET /breeds`
    pub async fn list_breeds(&self) -> Result<Vec<Breed>, ApiError> {
        self.client.request("/breeds", &[]).await
    }

    /// `GET /breeds/{id}`. A blank id is rejected as `InvalidUrl` before any
    /// request is sent.
    pub async fn get_breed(&self, id: &str) -> Result<Breed, ApiError> {
        self.client.request_resource("/breeds", id).await
    }

    /// `GET /images/search?breed_ids={id}&limit={n}` with the configured limit.
    pub async fn list_images_for_breed(&self, id: &str) -> Result<Vec<CatImage>, ApiError> {
        self.list_images_for_breed_with_limit(id, self.image_limit).await
    }

    pub async fn list_images_for_breed_with_limit(
        &self,
        id: &str,
        limit: u32,
    ) -> Result<Vec<CatImage>, ApiError> {
        let limit = limit.to_string();
        self.client
            .request("/images/search", &[("breed_ids", id), ("limit", &limit)])
            .await
    }
}

/// Breeds whose name contains `query`, ignoring case. An empty query keeps
/// every breed; whitespace is matched literally.
pub fn filter_breeds<'a>(breeds: &'a [Breed], query: &str) -> Vec<&'a Breed> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return breeds.iter().collect();
    }
    breeds
        .iter()
        .filter(|b| b.name.to_lowercase().contains(&needle))
        .collect()
}
