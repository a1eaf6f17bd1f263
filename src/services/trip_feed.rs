// src/services/trip_feed.rs
// DOCUMENTATION: GPS ping ingestion and the live trip feed
// PURPOSE: Validate pings, summarise the travelled route, export it as GeoJSON

use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::models::{
    CreatePingRequest, LocationPing, PhotoFilter, PingQuery, TripFeedResponse,
};
use chrono::{DateTime, Duration, Utc};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use uuid::Uuid;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Pings may be stamped slightly ahead of the server clock
const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

pub const DEFAULT_PING_LIMIT: i64 = 500;
pub const MAX_PING_LIMIT: i64 = 5000;

/// Photos shown in the trip feed
const FEED_PHOTO_COUNT: i64 = 6;

/// Great-circle distance in kilometers between two (lat, lon) points
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;
    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Length of the route through `pings` (expected in time order)
pub fn total_distance_km(pings: &[LocationPing]) -> f64 {
    pings
        .windows(2)
        .map(|pair| {
            haversine_km(
                (pair[0].latitude, pair[0].longitude),
                (pair[1].latitude, pair[1].longitude),
            )
        })
        .sum()
}

pub struct TripFeedService;

impl TripFeedService {
    /// Check ranges and build the row to store
    /// DOCUMENTATION: `now` is injected so the clock-skew rule is testable
    pub fn validate_ping(
        req: &CreatePingRequest,
        now: DateTime<Utc>,
    ) -> Result<LocationPing, TravelError> {
        if !req.latitude.is_finite() || !(-90.0..=90.0).contains(&req.latitude) {
            return Err(TravelError::ValidationError(format!(
                "Breitengrad muss zwischen -90 und 90 liegen (erhalten: {})",
                req.latitude
            )));
        }
        if !req.longitude.is_finite() || !(-180.0..=180.0).contains(&req.longitude) {
            return Err(TravelError::ValidationError(format!(
                "Längengrad muss zwischen -180 und 180 liegen (erhalten: {})",
                req.longitude
            )));
        }
        if let Some(accuracy) = req.accuracy_m {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(TravelError::ValidationError(
                    "Genauigkeit darf nicht negativ sein".to_string(),
                ));
            }
        }
        if let Some(heading) = req.heading {
            if !heading.is_finite() || !(0.0..360.0).contains(&heading) {
                return Err(TravelError::ValidationError(
                    "Richtung muss zwischen 0 und 360 Grad liegen".to_string(),
                ));
            }
        }
        if let Some(battery) = req.battery {
            if !(0..=100).contains(&battery) {
                return Err(TravelError::ValidationError(
                    "Akkustand muss zwischen 0 und 100 liegen".to_string(),
                ));
            }
        }

        let recorded_at = req.recorded_at.unwrap_or(now);
        if recorded_at > now + Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
            return Err(TravelError::ValidationError(
                "Zeitstempel liegt in der Zukunft".to_string(),
            ));
        }

        Ok(LocationPing {
            id: Uuid::new_v4(),
            latitude: req.latitude,
            longitude: req.longitude,
            accuracy_m: req.accuracy_m,
            altitude_m: req.altitude_m,
            speed_kmh: req.speed_kmh,
            heading: req.heading,
            battery: req.battery,
            note: req.note.clone(),
            recorded_at,
            created_at: now,
        })
    }

    pub async fn record_ping(
        store: &dyn TravelStore,
        req: &CreatePingRequest,
    ) -> Result<LocationPing, TravelError> {
        let ping = Self::validate_ping(req, Utc::now()).map_err(|e| {
            log::warn!("Rejected ping: {}", e);
            e
        })?;

        let stored = store.insert_ping(&ping).await?;
        log::info!(
            "Recorded ping {:.5},{:.5} at {}",
            stored.latitude,
            stored.longitude,
            stored.recorded_at
        );
        Ok(stored)
    }

    pub async fn list_pings(
        store: &dyn TravelStore,
        query: &PingQuery,
    ) -> Result<Vec<LocationPing>, TravelError> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PING_LIMIT)
            .clamp(1, MAX_PING_LIMIT);
        store.list_pings(query.since, Some(limit)).await
    }

    /// Everything the live trip page needs in one response
    pub async fn feed(store: &dyn TravelStore) -> Result<TripFeedResponse, TravelError> {
        let settings = store.get_tour_settings().await?;
        let latest_ping = store.latest_ping().await?;
        let summary = store.ping_summary().await?;
        let recent_photos = store
            .page_trip_photos(&PhotoFilter::default(), None, FEED_PHOTO_COUNT)
            .await?;

        Ok(TripFeedResponse {
            settings,
            latest_ping,
            ping_count: summary.ping_count,
            total_distance_km: (summary.total_distance_km * 100.0).round() / 100.0,
            recent_photos,
        })
    }

    /// Route as a GeoJSON FeatureCollection
    /// DOCUMENTATION: A LineString over all pings (when there are at least
    /// two) followed by a Point for the current position
    pub async fn track(store: &dyn TravelStore) -> Result<FeatureCollection, TravelError> {
        let pings = store.list_pings(None, None).await?;
        Ok(Self::track_from_pings(&pings))
    }

    pub fn track_from_pings(pings: &[LocationPing]) -> FeatureCollection {
        let mut features = Vec::new();

        if pings.len() >= 2 {
            let line: geo_types::LineString<f64> = pings
                .iter()
                .map(|p| (p.longitude, p.latitude))
                .collect::<Vec<_>>()
                .into();

            let mut properties = JsonObject::new();
            properties.insert("kind".to_string(), "route".into());
            properties.insert("points".to_string(), pings.len().into());
            properties.insert(
                "distance_km".to_string(),
                ((total_distance_km(pings) * 100.0).round() / 100.0).into(),
            );
            if let (Some(first), Some(last)) = (pings.first(), pings.last()) {
                properties.insert("start".to_string(), first.recorded_at.to_rfc3339().into());
                properties.insert("end".to_string(), last.recorded_at.to_rfc3339().into());
            }

            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&line))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }

        if let Some(latest) = pings.last() {
            let point = geo_types::Point::new(latest.longitude, latest.latitude);

            let mut properties = JsonObject::new();
            properties.insert("kind".to_string(), "current".into());
            properties.insert("recorded_at".to_string(), latest.recorded_at.to_rfc3339().into());

            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&point))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(lat: f64, lon: f64) -> CreatePingRequest {
        CreatePingRequest {
            latitude: lat,
            longitude: lon,
            accuracy_m: None,
            altitude_m: None,
            speed_kmh: None,
            heading: None,
            battery: None,
            note: None,
            recorded_at: None,
        }
    }

    fn ping(lat: f64, lon: f64, minutes: i64) -> LocationPing {
        let now = Utc::now();
        let mut p = TripFeedService::validate_ping(&request(lat, lon), now).unwrap();
        p.recorded_at = now + Duration::minutes(minutes);
        p
    }

    #[test]
    fn test_coordinate_ranges() {
        let now = Utc::now();
        assert!(TripFeedService::validate_ping(&request(90.0, 180.0), now).is_ok());
        assert!(TripFeedService::validate_ping(&request(-90.0, -180.0), now).is_ok());
        assert!(TripFeedService::validate_ping(&request(90.1, 0.0), now).is_err());
        assert!(TripFeedService::validate_ping(&request(0.0, -180.5), now).is_err());
        assert!(TripFeedService::validate_ping(&request(f64::NAN, 0.0), now).is_err());
    }

    #[test]
    fn test_optional_field_ranges() {
        let now = Utc::now();

        let mut req = request(48.0, 11.0);
        req.battery = Some(101);
        assert!(TripFeedService::validate_ping(&req, now).is_err());

        let mut req = request(48.0, 11.0);
        req.heading = Some(360.0);
        assert!(TripFeedService::validate_ping(&req, now).is_err());

        let mut req = request(48.0, 11.0);
        req.accuracy_m = Some(-1.0);
        assert!(TripFeedService::validate_ping(&req, now).is_err());
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let now = Utc::now();

        let mut req = request(48.0, 11.0);
        req.recorded_at = Some(now + Duration::minutes(2));
        assert!(TripFeedService::validate_ping(&req, now).is_ok());

        req.recorded_at = Some(now + Duration::minutes(30));
        assert!(TripFeedService::validate_ping(&req, now).is_err());
    }

    #[test]
    fn test_haversine_known_distance() {
        // Berlin -> Munich is roughly 504 km
        let d = haversine_km((52.5200, 13.4050), (48.1351, 11.5820));
        assert!((d - 504.0).abs() < 5.0, "distance was {}", d);
        assert_eq!(haversine_km((10.0, 10.0), (10.0, 10.0)), 0.0);
    }

    #[test]
    fn test_total_distance() {
        let pings = vec![ping(0.0, 0.0, 0), ping(0.0, 1.0, 10), ping(0.0, 2.0, 20)];
        let d = total_distance_km(&pings);
        // One degree of longitude at the equator is about 111.2 km
        assert!((d - 222.4).abs() < 1.0, "distance was {}", d);
        assert_eq!(total_distance_km(&pings[..1]), 0.0);
    }

    #[test]
    fn test_track_features() {
        assert!(TripFeedService::track_from_pings(&[]).features.is_empty());

        // a LineString needs two positions, so one ping is only a Point
        let single = TripFeedService::track_from_pings(&[ping(1.0, 2.0, 0)]);
        assert_eq!(single.features.len(), 1);
        let json = serde_json::to_value(&single).unwrap();
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
        assert_eq!(json["features"][0]["properties"]["kind"], "current");

        let route = TripFeedService::track_from_pings(&[ping(1.0, 2.0, 0), ping(1.5, 2.5, 5)]);
        assert_eq!(route.features.len(), 2);

        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["geometry"]["type"], "LineString");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0][0], 2.0);
        assert_eq!(json["features"][1]["geometry"]["type"], "Point");
    }
}
