// src/models/trip_photo.rs
// DOCUMENTATION: Trip photo data structures
// PURPOSE: Uploaded media records, paging cursor and page responses

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::TravelError;

/// Kind of uploaded media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Classify a MIME type; anything but image/* and video/* is rejected
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next().unwrap_or_default();
        match top {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }
}

/// A user-uploaded image or video
/// DOCUMENTATION: Maps directly to the trip_photos table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripPhoto {
    pub id: Uuid,
    pub location_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,

    /// Public URL of the media file
    pub url: String,

    /// File name inside the media directory
    #[serde(skip_serializing, default)]
    pub storage_key: String,

    /// "image" or "video"
    pub media_type: String,
    pub mime_type: String,
    pub file_size: i64,
    pub caption: Option<String>,

    /// Never negative
    pub likes: i64,

    /// Capture time reported by the uploader
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TripPhoto {
    /// Day used for timeline grouping
    pub fn display_date(&self) -> NaiveDate {
        self.taken_at.unwrap_or(self.created_at).date_naive()
    }

    pub fn cursor(&self) -> PhotoCursor {
        PhotoCursor {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

/// Row to insert after the media file was stored
#[derive(Debug, Clone)]
pub struct NewTripPhoto {
    pub id: Uuid,
    pub location_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
    pub url: String,
    pub storage_key: String,
    pub media_type: MediaType,
    pub mime_type: String,
    pub file_size: i64,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
}

/// Position in the (created_at DESC, id DESC) ordering
/// DOCUMENTATION: Encoded as "<unix micros>_<uuid>"; microseconds match
/// the precision of a Postgres timestamptz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl PhotoCursor {
    pub fn encode(&self) -> String {
        format!("{}_{}", self.created_at.timestamp_micros(), self.id)
    }

    pub fn decode(raw: &str) -> Result<Self, TravelError> {
        let invalid = || TravelError::InvalidInput(format!("Ungültiger Cursor '{}'", raw));

        let (micros, id) = raw.split_once('_').ok_or_else(invalid)?;
        let micros: i64 = micros.parse().map_err(|_| invalid())?;
        let created_at = Utc
            .timestamp_opt(
                micros.div_euclid(1_000_000),
                (micros.rem_euclid(1_000_000) * 1_000) as u32,
            )
            .single()
            .ok_or_else(invalid)?;
        let id = Uuid::parse_str(id).map_err(|_| invalid())?;

        Ok(PhotoCursor { created_at, id })
    }

    /// True when `photo` comes strictly after this cursor in feed order
    pub fn is_before(&self, photo: &TripPhoto) -> bool {
        (photo.created_at, photo.id) < (self.created_at, self.id)
    }
}

/// Filters shared by both store backends
#[derive(Debug, Clone, Default)]
pub struct PhotoFilter {
    pub location_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
    pub media_type: Option<MediaType>,
}

impl PhotoFilter {
    pub fn matches(&self, photo: &TripPhoto) -> bool {
        self.location_id.map_or(true, |id| photo.location_id == Some(id))
            && self.creator_id.map_or(true, |id| photo.creator_id == Some(id))
            && self
                .media_type
                .map_or(true, |t| photo.media_type == t.as_str())
    }
}

/// Query parameters for GET /trip-photos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoPageQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
    pub location_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
    pub media_type: Option<MediaType>,
}

/// One page of the photo feed
#[derive(Debug, Serialize)]
pub struct TripPhotoPage {
    pub items: Vec<TripPhoto>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Photos taken on the same day
#[derive(Debug, Serialize)]
pub struct PhotoDayGroup {
    pub date: NaiveDate,
    pub photos: Vec<TripPhoto>,
}

/// Page of the photo feed grouped by day
#[derive(Debug, Serialize)]
pub struct GroupedTripPhotoPage {
    pub groups: Vec<PhotoDayGroup>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Response of the like endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub id: Uuid,
    pub likes: i64,
}
