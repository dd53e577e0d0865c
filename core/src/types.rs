//! Domain records for the cat catalog and the favorites collection.
//!
//! # Design
//! `Breed` and `CatImage` mirror the remote API's snake_case payloads and are
//! never mutated locally. `FavoriteRecord` is the persisted shape; it keeps a
//! denormalized snapshot of the breed so the favorites list renders without a
//! network round-trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const IMAGE_CDN: &str = "https://cdn2.thecatapi.com/images";

/// A cat breed from the remote catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image_id: Option<String>,
}

impl Breed {
    /// Individual traits from the comma-separated `temperament` field.
    pub fn temperament_traits(&self) -> Vec<&str> {
        self.temperament
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// CDN URL of the breed's reference image, if it has one.
    pub fn reference_image_url(&self) -> Option<String> {
        self.reference_image_id.as_deref().map(image_url_for)
    }
}

/// An image returned by `/images/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatImage {
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breeds: Option<Vec<Breed>>,
}

/// A persisted favorite: one per breed, pairing it with a chosen image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub breed_id: String,
    pub breed_name: String,
    pub image_id: String,
    pub origin: String,
    pub temperament: String,
    pub timestamp: DateTime<Utc>,
}

impl FavoriteRecord {
    /// Snapshot `breed` paired with `image_id`, stamped with the current time.
    pub fn new(breed: &Breed, image_id: impl Into<String>) -> Self {
        Self {
            breed_id: breed.id.clone(),
            breed_name: breed.name.clone(),
            image_id: image_id.into(),
            origin: breed.origin.clone(),
            temperament: breed.temperament.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn image_url(&self) -> String {
        image_url_for(&self.image_id)
    }
}

/// CDN URL for an image id, e.g. `https://cdn2.thecatapi.com/images/0XYvRd7oD.jpg`.
pub fn image_url_for(image_id: &str) -> String {
    format!("{IMAGE_CDN}/{image_id}.jpg")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Breed;

    pub fn abyssinian() -> Breed {
        Breed {
            id: "abys".to_string(),
            name: "Abyssinian".to_string(),
            temperament: "Active, Energetic, Independent, Intelligent, Gentle".to_string(),
            description: "The Abyssinian is easy to care for.".to_string(),
            origin: "Egypt".to_string(),
            life_span: "14 - 15".to_string(),
            adaptability: 5,
            affection_level: 5,
            child_friendly: 3,
            dog_friendly: 4,
            energy_level: 5,
            health_issues: 2,
            intelligence: 5,
            social_needs: 5,
            stranger_friendly: 5,
            wikipedia_url: Some("https://en.wikipedia.org/wiki/Abyssinian_(cat)".to_string()),
            reference_image_id: Some("0XYvRd7oD".to_string()),
        }
    }

    pub fn bengal() -> Breed {
        Breed {
            id: "beng".to_string(),
            name: "Bengal".to_string(),
            temperament: "Alert, Agile, Energetic, Demanding, Intelligent".to_string(),
            description: "Bengals are a lot of fun to live with.".to_string(),
            origin: "United States".to_string(),
            life_span: "12 - 15".to_string(),
            adaptability: 5,
            affection_level: 5,
            child_friendly: 4,
            dog_friendly: 5,
            energy_level: 5,
            health_issues: 3,
            intelligence: 5,
            social_needs: 5,
            stranger_friendly: 3,
            wikipedia_url: None,
            reference_image_id: None,
        }
    }
}
