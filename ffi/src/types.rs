//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Payloads cross the boundary as JSON text in `FfiCatResult::data_json`, in
//! the same snake_case / camelCase shapes the core serializes, so hosts can
//! decode them with their platform JSON parser. Decoded images cross as raw
//! RGBA8 pixels. Conversion helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use catapi_core::{ApiError, CachedImage, Services, StoreError};
use serde::Serialize;

/// Opaque handle. Owns the async runtime every call blocks on and the
/// services it drives.
pub struct FfiCatClient {
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) services: Services,
}

/// Error codes returned in `FfiCatResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    Network = 2,
    EmptyResponse = 3,
    Decode = 4,
    Http = 5,
    Persistence = 6,
    Serialization = 7,
    Panic = 8,
    NullArg = 9,
}

/// Result envelope for every data-returning call.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data_json`
/// holds the JSON payload (null when the call returns nothing).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data_json` is null.
#[repr(C)]
pub struct FfiCatResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_json: *mut c_char,
}

/// A decoded image as tightly packed RGBA8 rows.
#[repr(C)]
pub struct FfiImage {
    pub width: u32,
    pub height: u32,
    pub pixels: *mut u8,
    pub len: usize,
}

/// Owned C string from `s`. A string with an interior NUL becomes empty.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

impl FfiCatResult {
    fn boxed(
        error_code: FfiErrorCode,
        message: Option<String>,
        http_status: u16,
        data: Option<String>,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCatResult {
            error_code,
            error_message: message.map_or(std::ptr::null_mut(), |m| c_string(m)),
            http_status,
            data_json: data.map_or(std::ptr::null_mut(), |d| c_string(d)),
        }))
    }

    /// Success carrying `value` encoded as JSON.
    pub(crate) fn ok_json<T: Serialize>(value: &T) -> *mut Self {
        match serde_json::to_string(value) {
            Ok(json) => Self::boxed(FfiErrorCode::Ok, None, 0, Some(json)),
            Err(e) => Self::boxed(FfiErrorCode::Serialization, Some(e.to_string()), 0, None),
        }
    }

    /// Success with no payload (e.g. add, reset).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, None, 0, None)
    }

    pub(crate) fn from_api_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::InvalidUrl(_) => (FfiErrorCode::InvalidUrl, 0),
            ApiError::Network(_) => (FfiErrorCode::Network, 0),
            ApiError::EmptyResponse => (FfiErrorCode::EmptyResponse, 0),
            ApiError::Decode(_) => (FfiErrorCode::Decode, 0),
            ApiError::HttpStatus { status, .. } => (FfiErrorCode::Http, *status),
        };
        Self::boxed(code, Some(err.to_string()), status, None)
    }

    pub(crate) fn from_store_error(err: StoreError) -> *mut Self {
        let code = match &err {
            StoreError::Persistence(_) => FfiErrorCode::Persistence,
            StoreError::Serialization(_) => FfiErrorCode::Serialization,
        };
        Self::boxed(code, Some(err.to_string()), 0, None)
    }

    /// A JSON argument supplied by the host did not decode.
    pub(crate) fn bad_json(name: &str, err: serde_json::Error) -> *mut Self {
        Self::boxed(FfiErrorCode::Decode, Some(format!("invalid {name}: {err}")), 0, None)
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::NullArg, Some(format!("null argument: {name}")), 0, None)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, Some(msg.to_string()), 0, None)
    }
}

impl FfiImage {
    /// Copy `image` into a heap-allocated RGBA8 buffer.
    pub(crate) fn from_cached(image: &CachedImage) -> *mut Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.into_raw().into_boxed_slice();
        let len = pixels.len();
        Box::into_raw(Box::new(FfiImage {
            width,
            height,
            pixels: Box::into_raw(pixels) as *mut u8,
            len,
        }))
    }
}
