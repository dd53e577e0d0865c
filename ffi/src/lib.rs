//! C-ABI wrapper around `catapi-core`.
//!
//! # Overview
//! Exposes the breed catalog, favorites store, and image cache through
//! `extern "C"` functions so a host UI written in any language with a C FFI can
//! drive the core without linking to Rust's async runtime directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The client handle owns a multi-thread tokio runtime; each call blocks the
//!   calling host thread until its operation completes. Calls from several
//!   host threads run concurrently.
//! - A single `FfiCatResult` envelope carries JSON payloads and errors
//!   uniformly. Images come back as `FfiImage` or null.
//! - The C caller owns all returned pointers and must call the matching
//!   `catapi_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::panic::{catch_unwind, AssertUnwindSafe};

use catapi_core::{Breed, Config, FavoriteRecord, Services};
use tracing_subscriber::EnvFilter;

use types::*;

/// Borrow a C string argument. Null yields `None`; invalid UTF-8 yields "".
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or(""))
}

/// Run `f` against a non-null client, converting a null handle and any panic
/// into an error result.
fn with_client<F>(client: *const FfiCatClient, name: &str, f: F) -> *mut FfiCatResult
where
    F: FnOnce(&FfiCatClient) -> *mut FfiCatResult,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiCatResult::null_arg("client");
        }
        f(unsafe { &*client })
    }))
    .unwrap_or_else(|_| FfiCatResult::panic(&format!("panic in {name}")))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client. Settings start from the user's config file and
/// `CATAPI_*` environment variables; any non-null argument overrides the
/// matching setting.
///
/// Returns null if the runtime cannot start, the configuration is invalid, or
/// an internal panic occurs. Free with `catapi_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_client_new(
    base_url: *const c_char,
    api_key: *const c_char,
    favorites_dir: *const c_char,
) -> *mut FfiCatClient {
    catch_unwind(|| {
        let config = base_config(&Config::config_path(), |key| std::env::var(key).ok());
        unsafe { open_client(config, base_url, api_key, favorites_dir) }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// The config file at `path` with environment overrides from `lookup`. An
/// unreadable file falls back to the defaults; the overrides still apply.
/// Validation is left to `Services`, after the caller's arguments are in.
fn base_config<F>(path: &Path, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::load_from(path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config");
        Config::default()
    });
    config.apply_env(lookup);
    config
}

/// Apply the non-null arguments to `config` and start a client on it.
///
/// # Safety
/// Each pointer must be null or a valid NUL-terminated string.
unsafe fn open_client(
    mut config: Config,
    base_url: *const c_char,
    api_key: *const c_char,
    favorites_dir: *const c_char,
) -> *mut FfiCatClient {
    if let Some(url) = unsafe { str_arg(base_url) } {
        config.base_url = url.to_string();
    }
    if let Some(key) = unsafe { str_arg(api_key) } {
        config.api_key = key.to_string();
    }
    if let Some(dir) = unsafe { str_arg(favorites_dir) } {
        config.favorites_dir = dir.into();
    }

    let Ok(runtime) = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    else {
        return std::ptr::null_mut();
    };
    match Services::from_config(&config) {
        Ok(services) => Box::into_raw(Box::new(FfiCatClient { runtime, services })),
        Err(e) => {
            tracing::warn!(error = %e, "rejecting client configuration");
            std::ptr::null_mut()
        }
    }
}

/// Free a client created by `catapi_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_client_free(client: *mut FfiCatClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `info`). Returns false if a subscriber was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_init_logging() -> bool {
    catch_unwind(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// List every breed. `data_json` is an array of breeds.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_list_breeds(client: *const FfiCatClient) -> *mut FfiCatResult {
    with_client(client, "catapi_list_breeds", |c| {
        match c.runtime.block_on(c.services.catalog.list_breeds()) {
            Ok(breeds) => FfiCatResult::ok_json(&breeds),
            Err(e) => FfiCatResult::from_api_error(e),
        }
    })
}

/// Fetch one breed by id. `data_json` is a breed object.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_get_breed(
    client: *const FfiCatClient,
    breed_id: *const c_char,
) -> *mut FfiCatResult {
    with_client(client, "catapi_get_breed", |c| {
        let Some(id) = (unsafe { str_arg(breed_id) }) else {
            return FfiCatResult::null_arg("breed_id");
        };
        match c.runtime.block_on(c.services.catalog.get_breed(id)) {
            Ok(breed) => FfiCatResult::ok_json(&breed),
            Err(e) => FfiCatResult::from_api_error(e),
        }
    })
}

/// List images for a breed. `limit` 0 uses the configured default.
/// `data_json` is an array of images, possibly empty.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_list_breed_images(
    client: *const FfiCatClient,
    breed_id: *const c_char,
    limit: u32,
) -> *mut FfiCatResult {
    with_client(client, "catapi_list_breed_images", |c| {
        let Some(id) = (unsafe { str_arg(breed_id) }) else {
            return FfiCatResult::null_arg("breed_id");
        };
        let catalog = &c.services.catalog;
        let result = if limit == 0 {
            c.runtime.block_on(catalog.list_images_for_breed(id))
        } else {
            c.runtime
                .block_on(catalog.list_images_for_breed_with_limit(id, limit))
        };
        match result {
            Ok(images) => FfiCatResult::ok_json(&images),
            Err(e) => FfiCatResult::from_api_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

/// List favorites, most recently added first. `data_json` is an array of
/// favorite records.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_favorites_list(client: *const FfiCatClient) -> *mut FfiCatResult {
    with_client(client, "catapi_favorites_list", |c| {
        let records = c.runtime.block_on(c.services.favorites.list_recent());
        FfiCatResult::ok_json(&records)
    })
}

/// Favorite `image_id` for the breed encoded in `breed_json` (a breed object
/// as returned by the catalog calls). Replaces any existing favorite for that
/// breed.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_favorites_add(
    client: *const FfiCatClient,
    breed_json: *const c_char,
    image_id: *const c_char,
) -> *mut FfiCatResult {
    with_client(client, "catapi_favorites_add", |c| {
        let Some(raw) = (unsafe { str_arg(breed_json) }) else {
            return FfiCatResult::null_arg("breed_json");
        };
        let Some(image_id) = (unsafe { str_arg(image_id) }) else {
            return FfiCatResult::null_arg("image_id");
        };
        let breed: Breed = match serde_json::from_str(raw) {
            Ok(breed) => breed,
            Err(e) => return FfiCatResult::bad_json("breed_json", e),
        };
        let record = FavoriteRecord::new(&breed, image_id);
        match c.runtime.block_on(c.services.favorites.add(record)) {
            Ok(()) => FfiCatResult::ok_empty(),
            Err(e) => FfiCatResult::from_store_error(e),
        }
    })
}

/// Remove the favorite for `breed_id`. `data_json` is `true` if one was
/// removed, `false` if none existed.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_favorites_remove(
    client: *const FfiCatClient,
    breed_id: *const c_char,
) -> *mut FfiCatResult {
    with_client(client, "catapi_favorites_remove", |c| {
        let Some(id) = (unsafe { str_arg(breed_id) }) else {
            return FfiCatResult::null_arg("breed_id");
        };
        match c.runtime.block_on(c.services.favorites.remove(id)) {
            Ok(removed) => FfiCatResult::ok_json(&removed),
            Err(e) => FfiCatResult::from_store_error(e),
        }
    })
}

/// `data_json` is `true` if `breed_id` is a favorite.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_favorites_contains(
    client: *const FfiCatClient,
    breed_id: *const c_char,
) -> *mut FfiCatResult {
    with_client(client, "catapi_favorites_contains", |c| {
        let Some(id) = (unsafe { str_arg(breed_id) }) else {
            return FfiCatResult::null_arg("breed_id");
        };
        let found = c.runtime.block_on(c.services.favorites.contains(id));
        FfiCatResult::ok_json(&found)
    })
}

/// Drop every stored favorite.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_favorites_reset(client: *const FfiCatClient) -> *mut FfiCatResult {
    with_client(client, "catapi_favorites_reset", |c| {
        match c.runtime.block_on(c.services.favorites.reset()) {
            Ok(()) => FfiCatResult::ok_empty(),
            Err(e) => FfiCatResult::from_store_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Resolve `url` to decoded pixels, fetching on a cache miss.
///
/// Returns null on any failure, including cancellation; the host shows a
/// placeholder. Free with `catapi_free_image`.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_image_resolve(
    client: *const FfiCatClient,
    url: *const c_char,
) -> *mut FfiImage {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let c = unsafe { &*client };
        let Some(url) = (unsafe { str_arg(url) }) else {
            return std::ptr::null_mut();
        };
        match c.runtime.block_on(c.services.images.resolve(url)) {
            Some(image) => FfiImage::from_cached(&image),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Drop every cached image. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_images_clear(client: *const FfiCatClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &*client }.services.images.clear()));
    }
}

/// Ask every in-flight `catapi_image_resolve` to give up; they return null.
/// Does not wait. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_images_cancel_all(client: *const FfiCatClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            unsafe { &*client }.services.images.cancel_all()
        }));
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by any data-returning call. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_free_result(result: *mut FfiCatResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data_json.is_null() {
            drop(unsafe { CString::from_raw(result.data_json) });
        }
    });
}

/// Free an image returned by `catapi_image_resolve`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_free_image(image: *mut FfiImage) {
    if image.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let image = unsafe { Box::from_raw(image) };
        if !image.pixels.is_null() {
            let pixels = std::ptr::slice_from_raw_parts_mut(image.pixels, image.len);
            drop(unsafe { Box::from_raw(pixels) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catapi_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
