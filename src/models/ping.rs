// src/models/ping.rs
// DOCUMENTATION: GPS ping data structures
// PURPOSE: Position reports of the travelling device and the trip feed response

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{TourSettings, TripPhoto};

/// One stored GPS position
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LocationPing {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
    pub altitude_m: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub heading: Option<f64>,
    pub battery: Option<i32>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Body of POST /trip/pings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePingRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    #[serde(default)]
    pub altitude_m: Option<f64>,
    #[serde(default)]
    pub speed_kmh: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub battery: Option<i32>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Query for GET /trip/pings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PingQuery {
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Count and route length over all pings in time order
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct PingSummary {
    pub ping_count: i64,
    pub total_distance_km: f64,
}

/// Response of GET /trip/feed
#[derive(Debug, Serialize)]
pub struct TripFeedResponse {
    pub settings: TourSettings,
    pub latest_ping: Option<LocationPing>,
    pub ping_count: i64,
    pub total_distance_km: f64,
    pub recent_photos: Vec<TripPhoto>,
}
