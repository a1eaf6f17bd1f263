// src/db/ping_repository.rs
// DOCUMENTATION: GPS ping database operations
// PURPOSE: Append-only access to location_pings

use crate::db::pg_store::map_db_error;
use crate::errors::TravelError;
use crate::models::{LocationPing, PingSummary};
use crate::services::EARTH_RADIUS_KM;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PingRepository;

impl PingRepository {
    pub async fn insert(pool: &PgPool, ping: &LocationPing) -> Result<LocationPing, TravelError> {
        sqlx::query_as::<_, LocationPing>(
            r#"
            INSERT INTO location_pings (
                id, latitude, longitude, accuracy_m, altitude_m,
                speed_kmh, heading, battery, note, recorded_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(ping.id)
        .bind(ping.latitude)
        .bind(ping.longitude)
        .bind(ping.accuracy_m)
        .bind(ping.altitude_m)
        .bind(ping.speed_kmh)
        .bind(ping.heading)
        .bind(ping.battery)
        .bind(&ping.note)
        .bind(ping.recorded_at)
        .bind(ping.created_at)
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("Insert ping", e))
    }

    pub async fn latest(pool: &PgPool) -> Result<Option<LocationPing>, TravelError> {
        sqlx::query_as::<_, LocationPing>(
            "SELECT * FROM location_pings ORDER BY recorded_at DESC, created_at DESC LIMIT 1",
        )
        .fetch_optional(pool)
        .await
        .map_err(|e| map_db_error("Fetch latest ping", e))
    }

    /// Newest `limit` pings since `since`, returned oldest first
    pub async fn list(
        pool: &PgPool,
        since: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<LocationPing>, TravelError> {
        sqlx::query_as::<_, LocationPing>(
            r#"
            SELECT * FROM (
                SELECT * FROM location_pings
                WHERE ($1::timestamptz IS NULL OR recorded_at >= $1)
                ORDER BY recorded_at DESC, created_at DESC
                LIMIT $2
            ) newest
            ORDER BY recorded_at ASC, created_at ASC
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| map_db_error("List pings", e))
    }

    /// Haversine over consecutive pings, summed in SQL
    pub async fn summary(pool: &PgPool) -> Result<PingSummary, TravelError> {
        sqlx::query_as::<_, PingSummary>(
            r#"
            SELECT
                COUNT(*)::bigint AS ping_count,
                COALESCE(SUM(
                    2 * $1 * ASIN(SQRT(
                        POWER(SIN(RADIANS(lat - prev_lat) / 2), 2)
                        + COS(RADIANS(prev_lat)) * COS(RADIANS(lat))
                          * POWER(SIN(RADIANS(lon - prev_lon) / 2), 2)
                    ))
                ), 0)::float8 AS total_distance_km
            FROM (
                SELECT
                    latitude AS lat,
                    longitude AS lon,
                    LAG(latitude) OVER route AS prev_lat,
                    LAG(longitude) OVER route AS prev_lon
                FROM location_pings
                WINDOW route AS (ORDER BY recorded_at ASC, created_at ASC)
            ) legs
            "#,
        )
        .bind(EARTH_RADIUS_KM)
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("Summarise pings", e))
    }
}
