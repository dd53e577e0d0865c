//! Authenticated request builder, response parser, and executor for the cat API.
//!
//! # Design
//! `CatApiClient` holds the base URL, the API key, and a shared `Transport`.
//! Each call is split into `build_request` (pure, produces an `HttpRequest`)
//! and `parse` (pure, consumes an `HttpResponse`), with `request` executing the
//! round-trip between them. Keeping the two halves pure lets them be tested
//! without any I/O.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Client for the cat API. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct CatApiClient {
    base_url: String,
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl CatApiClient {
    pub fn new(base_url: &str, api_key: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET for `endpoint` (e.g. `/breeds`) with percent-encoded
    /// `query` pairs and the API key header attached.
    pub fn build_request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint_url(endpoint)?;
        Ok(self.finish(url, query))
    }

    /// Build a GET for the single resource `id` under `endpoint`
    /// (e.g. `/breeds` + `abys`). The id is always one encoded path segment,
    /// so `/`, `?` and `#` inside it cannot reach another route.
    pub fn build_resource_request(
        &self,
        endpoint: &str,
        id: &str,
        query: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidUrl(format!("invalid resource id {id:?}")));
        }
        let mut url = self.endpoint_url(endpoint)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url_string(&self.base_url, endpoint)))?
            .push(id);
        Ok(self.finish(url, query))
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        let raw = url_string(&self.base_url, endpoint);
        let url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(raw));
        }
        Ok(url)
    }

    fn finish(&self, mut url: Url, query: &[(&str, &str)]) -> HttpRequest {
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        HttpRequest {
            url: url.into(),
            headers: vec![(API_KEY_HEADER.to_string(), self.api_key.clone())],
        }
    }

    /// Decode a response body into `T`.
    ///
    /// Non-2xx statuses are reported before decoding so an error payload is
    /// never mistaken for a shape mismatch.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        if !response.is_success() {
            return Err(ApiError::HttpStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        if response.body.is_empty() {
            return Err(ApiError::EmptyResponse);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Build, execute, and parse in one step.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = self.build_request(endpoint, query)?;
        self.send(request).await
    }

    /// `request` for the single resource `id` under `endpoint`.
    pub async fn request_resource<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: &str,
    ) -> Result<T, ApiError> {
        let request = self.build_resource_request(endpoint, id, &[])?;
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let url = request.url.clone();
        debug!(url = %url, "catalog request");

        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(url = %url, error = %e, "catalog request failed");
            ApiError::Network(e)
        })?;
        debug!(url = %url, status = response.status, bytes = response.body.len(), "catalog response");

        self.parse(response).inspect_err(|e| {
            warn!(url = %url, error = %e, "catalog response rejected");
        })
    }
}

fn url_string(base_url: &str, endpoint: &str) -> String {
    format!("{base_url}{endpoint}")
}
