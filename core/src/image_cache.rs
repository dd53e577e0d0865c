//! Bounded in-memory cache of decoded images keyed by URL.
//!
//! # Design
//! Entries live in an LRU map behind a `parking_lot::Mutex`; the lock is never
//! held across an await. A miss fetches the URL through the shared
//! `Transport`, decodes the bytes off the async workers, and stores the result.
//! Every failure (transport, status, decode, cancellation) resolves to `None`
//! so callers can fall back to a placeholder.
//!
//! Cancellation is a generation counter on a `watch` channel. Each resolve
//! subscribes before fetching and gives up as soon as the generation moves.
//! Concurrent misses for the same URL are not coalesced; each one fetches.

use std::num::NonZeroUsize;
use std::sync::Arc;

use image::DynamicImage;
use lru::LruCache;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::http::{HttpRequest, Transport};

/// A decoded image shared between the cache and its callers.
pub type CachedImage = Arc<DynamicImage>;

pub struct ImageCache {
    transport: Arc<dyn Transport>,
    entries: Mutex<LruCache<String, CachedImage>>,
    generation: watch::Sender<u64>,
}

impl ImageCache {
    pub fn new(transport: Arc<dyn Transport>, capacity: NonZeroUsize) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            transport,
            entries: Mutex::new(LruCache::new(capacity)),
            generation,
        }
    }

    /// Return the decoded image for `url`, fetching it on a miss.
    pub async fn resolve(&self, url: &str) -> Option<CachedImage> {
        if let Some(hit) = self.entries.lock().get(url) {
            trace!(url, "image cache hit");
            return Some(Arc::clone(hit));
        }

        let mut cancelled = self.generation.subscribe();
        let image = tokio::select! {
            image = self.fetch(url) => image?,
            _ = cancelled.changed() => {
                debug!(url, "image fetch cancelled");
                return None;
            }
        };

        // The fetch may have finished in the same poll that cancellation fired.
        if cancelled.has_changed().unwrap_or(true) {
            return None;
        }

        self.entries.lock().put(url.to_string(), Arc::clone(&image));
        Some(image)
    }

    async fn fetch(&self, url: &str) -> Option<CachedImage> {
        let response = match self.transport.execute(HttpRequest::get(url)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "image fetch failed");
                return None;
            }
        };
        if !response.is_success() {
            warn!(url, status = response.status, "image fetch rejected");
            return None;
        }

        let body = response.body;
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&body)).await;
        match decoded {
            Ok(Ok(image)) => Some(Arc::new(image)),
            Ok(Err(e)) => {
                warn!(url, error = %e, "image decode failed");
                None
            }
            Err(e) => {
                warn!(url, error = %e, "image decode task aborted");
                None
            }
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Signal every in-flight `resolve` to give up. Does not wait for them.
    pub fn cancel_all(&self) {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
    }

    /// Whether `url` is cached. Does not affect recency.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}
