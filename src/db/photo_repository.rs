// src/db/photo_repository.rs
// DOCUMENTATION: Trip photo database operations
// PURPOSE: Insert, keyset paging and like counters for trip_photos

use crate::db::pg_store::map_db_error;
use crate::errors::TravelError;
use crate::models::{NewTripPhoto, PhotoCursor, PhotoFilter, TripPhoto};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub struct PhotoRepository;

impl PhotoRepository {
    /// Insert an uploaded photo
    /// DOCUMENTATION: Unknown location/creator ids fail the foreign key and
    /// are reported as invalid input
    pub async fn create_photo(pool: &PgPool, photo: &NewTripPhoto) -> Result<TripPhoto, TravelError> {
        let record = sqlx::query_as::<_, TripPhoto>(
            r#"
            INSERT INTO trip_photos (
                id, location_id, creator_id, url, storage_key,
                media_type, mime_type, file_size, caption, likes,
                taken_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10, NOW())
            RETURNING *
            "#,
        )
        .bind(photo.id)
        .bind(photo.location_id)
        .bind(photo.creator_id)
        .bind(&photo.url)
        .bind(&photo.storage_key)
        .bind(photo.media_type.as_str())
        .bind(&photo.mime_type)
        .bind(photo.file_size)
        .bind(&photo.caption)
        .bind(photo.taken_at)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                log::warn!("Photo {} references unknown location or creator", photo.id);
                TravelError::InvalidInput("Unbekannter Ort oder Ersteller".to_string())
            }
            other => map_db_error("Create photo", other),
        })?;

        log::info!("Stored trip photo {} ({} bytes)", record.id, record.file_size);
        Ok(record)
    }

    pub async fn get_photo(pool: &PgPool, id: Uuid) -> Result<TripPhoto, TravelError> {
        sqlx::query_as::<_, TripPhoto>("SELECT * FROM trip_photos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("Fetch photo", e))?
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }

    /// Keyset page in (created_at DESC, id DESC) order
    pub async fn page_photos(
        pool: &PgPool,
        filter: &PhotoFilter,
        after: Option<&PhotoCursor>,
        fetch: i64,
    ) -> Result<Vec<TripPhoto>, TravelError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM trip_photos WHERE TRUE");

        if let Some(location_id) = filter.location_id {
            builder.push(" AND location_id = ").push_bind(location_id);
        }
        if let Some(creator_id) = filter.creator_id {
            builder.push(" AND creator_id = ").push_bind(creator_id);
        }
        if let Some(media_type) = filter.media_type {
            builder.push(" AND media_type = ").push_bind(media_type.as_str());
        }
        if let Some(cursor) = after {
            builder
                .push(" AND (created_at, id) < (")
                .push_bind(cursor.created_at)
                .push(", ")
                .push_bind(cursor.id)
                .push(")");
        }
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(fetch);

        builder
            .build_query_as::<TripPhoto>()
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("Page photos", e))
    }

    /// Atomic increment, returns the new count
    pub async fn like_photo(pool: &PgPool, id: Uuid) -> Result<i64, TravelError> {
        let row: Option<(i64,)> =
            sqlx::query_as("UPDATE trip_photos SET likes = likes + 1 WHERE id = $1 RETURNING likes")
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(|e| map_db_error("Like photo", e))?;

        row.map(|r| r.0)
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }

    /// Atomic decrement floored at zero, returns the new count
    pub async fn unlike_photo(pool: &PgPool, id: Uuid) -> Result<i64, TravelError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE trip_photos SET likes = GREATEST(likes - 1, 0) WHERE id = $1 RETURNING likes",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_db_error("Unlike photo", e))?;

        row.map(|r| r.0)
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }

    pub async fn delete_photo(pool: &PgPool, id: Uuid) -> Result<TripPhoto, TravelError> {
        sqlx::query_as::<_, TripPhoto>("DELETE FROM trip_photos WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("Delete photo", e))?
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }
}
