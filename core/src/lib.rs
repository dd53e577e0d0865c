//! Data-access core for a cat breed browser.
//!
//! # Overview
//! Fetches breeds and breed images from the cat API, caches decoded images in
//! memory, and persists the user's favorite breed/image pairs locally. The UI
//! layer is a separate collaborator that calls into `Services`; nothing here
//! depends on it.
//!
//! # Design
//! - `CatApiClient` splits every call into a pure `build_request` and a pure
//!   `parse`, with a `Transport` executing the round-trip in between.
//! - `BreedCatalog` is a thin typed wrapper; API errors pass through it
//!   unchanged.
//! - `ImageCache` is a count-bounded LRU that collapses every failure to
//!   `None`.
//! - `FavoritesStore` rewrites one JSON blob per mutation under an async lock
//!   and self-heals from a corrupt blob.
//! - `Services` is constructed explicitly by the entry point; there are no
//!   globals, so tests inject fakes.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod http;
pub mod image_cache;
pub mod services;
pub mod storage;
pub mod types;

pub use catalog::{filter_breeds, BreedCatalog};
pub use client::CatApiClient;
pub use config::Config;
pub use error::{ApiError, ConfigError, StoreError};
pub use favorites::FavoritesStore;
pub use http::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use image_cache::{CachedImage, ImageCache};
pub use services::Services;
pub use storage::{BlobStorage, FileBlobStorage, MemoryBlobStorage};
pub use types::{image_url_for, Breed, CatImage, FavoriteRecord};
