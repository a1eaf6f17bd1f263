// src/models/content.rs
// DOCUMENTATION: CMS content records
// PURPOSE: Creators, hero images, scenic content and tour settings

use crate::errors::TravelError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Person who uploads trip photos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Creator {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub instagram: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCreatorRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub avatar_url: Option<String>,
    #[validate(length(max = 60))]
    pub instagram: Option<String>,
}

/// Large banner image on the start page
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HeroImage {
    pub id: Uuid,
    pub url: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateHeroImageRequest {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Story block, optionally attached to a location
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScenicContent {
    pub id: Uuid,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub body: Option<String>,
    pub media_url: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateScenicContentRequest {
    pub location_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub body: Option<String>,
    #[validate(length(max = 2048))]
    pub media_url: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenicContentQuery {
    pub location_id: Option<Uuid>,
}

/// Singleton settings of the tour shown in the trip feed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TourSettings {
    pub title: String,
    pub subtitle: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Whether the live GPS feed is shown
    pub is_live: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for TourSettings {
    fn default() -> Self {
        TourSettings {
            title: "Unsere Reise".to_string(),
            subtitle: None,
            start_date: None,
            end_date: None,
            is_live: false,
            updated_at: Utc::now(),
        }
    }
}

/// Partial update for PUT /tour-settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTourSettingsRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_live: Option<bool>,
}

impl UpdateTourSettingsRequest {
    /// Apply the provided fields on top of `current`
    pub fn apply(&self, current: &TourSettings) -> TourSettings {
        TourSettings {
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            subtitle: self.subtitle.clone().or_else(|| current.subtitle.clone()),
            start_date: self.start_date.or(current.start_date),
            end_date: self.end_date.or(current.end_date),
            is_live: self.is_live.unwrap_or(current.is_live),
            updated_at: Utc::now(),
        }
    }

    /// Merged settings; the tour may not end before it starts
    pub fn merge(&self, current: &TourSettings) -> Result<TourSettings, TravelError> {
        let merged = self.apply(current);
        match (merged.start_date, merged.end_date) {
            (Some(start), Some(end)) if end < start => Err(TravelError::ValidationError(
                "Das Enddatum liegt vor dem Startdatum".to_string(),
            )),
            _ => Ok(merged),
        }
    }
}
