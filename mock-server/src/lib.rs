use std::{io::Cursor, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

pub const API_KEY: &str = "test-key";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Breed {
    pub id: String,
    pub name: String,
    pub temperament: String,
    pub description: String,
    pub origin: String,
    pub life_span: String,
    pub adaptability: u8,
    pub affection_level: u8,
    pub child_friendly: u8,
    pub dog_friendly: u8,
    pub energy_level: u8,
    pub health_issues: u8,
    pub intelligence: u8,
    pub social_needs: u8,
    pub stranger_friendly: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikipedia_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatImage {
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub breeds: Vec<Breed>,
}

/// An image the server knows about, tagged with the breed it belongs to.
#[derive(Clone, Debug)]
pub struct FixtureImage {
    pub id: String,
    pub breed_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Fixture {
    pub breeds: Vec<Breed>,
    pub images: Vec<FixtureImage>,
}

impl Fixture {
    /// Abyssinian and Bengal, one image each.
    pub fn sample() -> Self {
        Self {
            breeds: vec![
                breed("abys", "Abyssinian", "Egypt", "Active, Energetic, Independent"),
                breed("beng", "Bengal", "United States", "Alert, Agile, Energetic"),
            ],
            images: vec![
                FixtureImage {
                    id: "0XYvRd7oD".to_string(),
                    breed_id: "abys".to_string(),
                    width: 12,
                    height: 8,
                },
                FixtureImage {
                    id: "O3btzLlsO".to_string(),
                    breed_id: "beng".to_string(),
                    width: 6,
                    height: 6,
                },
            ],
        }
    }
}

pub fn breed(id: &str, name: &str, origin: &str, temperament: &str) -> Breed {
    Breed {
        id: id.to_string(),
        name: name.to_string(),
        temperament: temperament.to_string(),
        description: format!("The {name} is a fixture breed."),
        origin: origin.to_string(),
        life_span: "12 - 15".to_string(),
        adaptability: 5,
        affection_level: 4,
        child_friendly: 3,
        dog_friendly: 4,
        energy_level: 5,
        health_issues: 2,
        intelligence: 5,
        social_needs: 4,
        stranger_friendly: 3,
        wikipedia_url: Some(format!("https://en.wikipedia.org/wiki/{name}")),
        reference_image_id: None,
    }
}

#[derive(Clone)]
struct AppState {
    fixture: Arc<Fixture>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub breed_ids: Option<String>,
    pub limit: Option<usize>,
}

pub fn app() -> Router {
    app_with(Fixture::sample())
}

pub fn app_with(fixture: Fixture) -> Router {
    let state = AppState {
        fixture: Arc::new(fixture),
    };
    Router::new()
        .route("/v1/breeds", get(list_breeds))
        .route("/v1/breeds/{id}", get(get_breed))
        .route("/v1/images/search", get(search_images))
        .route("/images/{file}", get(image_bytes))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn authorize(headers: &HeaderMap) -> Result<(), StatusCode> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(API_KEY) => Ok(()),
        other => {
            debug!(present = other.is_some(), "rejecting request without valid api key");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn list_breeds(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Breed>>, StatusCode> {
    authorize(&headers)?;
    Ok(Json(state.fixture.breeds.clone()))
}

async fn get_breed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Breed>, StatusCode> {
    authorize(&headers)?;
    state
        .fixture
        .breeds
        .iter()
        .find(|b| b.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn search_images(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CatImage>>, StatusCode> {
    authorize(&headers)?;
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let limit = params.limit.unwrap_or(1);

    let images = state
        .fixture
        .images
        .iter()
        .filter(|img| params.breed_ids.as_deref().map_or(true, |id| img.breed_id == id))
        .take(limit)
        .map(|img| CatImage {
            id: img.id.clone(),
            url: format!("http://{host}/images/{}.png", img.id),
            width: img.width,
            height: img.height,
            breeds: state
                .fixture
                .breeds
                .iter()
                .filter(|b| b.id == img.breed_id)
                .cloned()
                .collect(),
        })
        .collect();
    Ok(Json(images))
}

async fn image_bytes(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    let id = file.split('.').next().unwrap_or_default();
    let Some(img) = state.fixture.images.iter().find(|img| img.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match render_png(img.width, img.height) {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// A solid-color PNG with the given dimensions.
pub fn render_png(width: u32, height: u32) -> Result<Vec<u8>, image::ImageError> {
    let img = RgbaImage::from_pixel(width, height, Rgba([180, 110, 60, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
