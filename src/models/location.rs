// src/models/location.rs
// DOCUMENTATION: Location catalog data structures
// PURPOSE: Records, request DTOs and responses for locations and their images

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::ScenicContent;

/// A stop of the trip
/// DOCUMENTATION: Maps directly to the locations table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,

    /// URL-friendly unique name, e.g. "lissabon"
    pub slug: String,

    pub name: String,
    pub description: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,

    /// Day the stop is (or was) visited
    pub visit_date: Option<NaiveDate>,

    /// Position in the itinerary
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Gallery image belonging to a location
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LocationImage {
    pub id: Uuid,
    pub location_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Slugs are lowercase ASCII letters, digits and single dashes
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if slug.is_empty() || !valid_chars || slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(ValidationError::new("slug"));
    }

    Ok(())
}

/// Request DTO for POST /locations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_slug")]
    pub slug: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(max = 120))]
    pub country: Option<String>,

    #[validate(length(max = 120))]
    pub region: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[serde(default)]
    pub visit_date: Option<NaiveDate>,

    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Request DTO for PUT /locations/{id}
/// DOCUMENTATION: All fields are optional - only provided fields are updated
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_slug")]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub visit_date: Option<NaiveDate>,
    pub sort_order: Option<i32>,
}

/// Request DTO for POST /locations/{id}/images
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLocationImageRequest {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,

    #[validate(length(max = 500))]
    pub caption: Option<String>,

    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Query parameters for GET /locations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQuery {
    /// Exact (case-insensitive) country match
    pub country: Option<String>,
    /// Substring match on the name
    pub q: Option<String>,
}

impl LocationQuery {
    /// In-memory equivalent of the SQL filter
    pub fn matches(&self, location: &Location) -> bool {
        if let Some(country) = &self.country {
            let same = location
                .country
                .as_deref()
                .map(|c| c.eq_ignore_ascii_case(country))
                .unwrap_or(false);
            if !same {
                return false;
            }
        }

        if let Some(q) = &self.q {
            if !location.name.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

/// Detailed response for GET /locations/{id_or_slug}
#[derive(Debug, Serialize)]
pub struct LocationDetailResponse {
    #[serde(flatten)]
    pub location: Location,
    pub images: Vec<LocationImage>,
    pub scenic_content: Vec<ScenicContent>,
}
