//! Error types for the cat API core.
//!
//! # Design
//! `ApiError` covers the remote catalog and passes through the catalog service
//! unchanged. `StoreError` covers the favorites store. The image cache has no
//! error type: every failure there collapses to "no image".

use std::path::PathBuf;

use thiserror::Error;

use crate::http::TransportError;

/// Errors returned by `CatApiClient` and `BreedCatalog`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL, endpoint, and query did not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The transport failed before a response arrived.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The transport succeeded but the body was empty.
    #[error("empty response")]
    EmptyResponse,

    /// The body did not match the expected JSON shape.
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

/// Errors returned by `FavoritesStore` mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium rejected a read, write, or remove.
    #[error("persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    /// The collection could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while loading or validating `Config`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config validation failed: {0}")]
    Validation(String),
}
