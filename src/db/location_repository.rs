// src/db/location_repository.rs
// DOCUMENTATION: Location database operations
// PURPOSE: SQL for the locations and location_images tables

use crate::db::pg_store::map_db_error;
use crate::errors::TravelError;
use crate::models::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// ILIKE pattern matching `q` anywhere in the name
/// DOCUMENTATION: Backslash is Postgres' default LIKE escape, so it is escaped
/// before the wildcards
fn name_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub struct LocationRepository;

impl LocationRepository {
    /// List locations ordered by itinerary position
    /// DOCUMENTATION: Optional country (exact, case-insensitive) and name filters
    pub async fn list(pool: &PgPool, query: &LocationQuery) -> Result<Vec<Location>, TravelError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM locations WHERE TRUE");

        if let Some(country) = &query.country {
            builder.push(" AND LOWER(country) = LOWER(").push_bind(country).push(")");
        }
        if let Some(q) = &query.q {
            builder
                .push(" AND name ILIKE ")
                .push_bind(name_pattern(q));
        }
        builder.push(" ORDER BY sort_order ASC, created_at ASC");

        builder
            .build_query_as::<Location>()
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("List locations", e))
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Location, TravelError> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("Fetch location", e))?
            .ok_or_else(|| {
                log::warn!("Location not found: {}", id);
                TravelError::NotFound(id.to_string())
            })
    }

    pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Location, TravelError> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("Fetch location by slug", e))?
            .ok_or_else(|| {
                log::warn!("Location not found with slug: {}", slug);
                TravelError::NotFound(slug.to_string())
            })
    }

    /// Insert a new location
    /// DOCUMENTATION: Duplicate slugs surface as AlreadyExists
    pub async fn create(pool: &PgPool, req: &CreateLocationRequest) -> Result<Location, TravelError> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (
                id, slug, name, description, country, region,
                latitude, longitude, visit_date, sort_order,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.slug)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.country)
        .bind(&req.region)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.visit_date)
        .bind(req.sort_order.unwrap_or(0))
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error(&req.slug, e))?;

        log::info!("Created location {} ({})", location.slug, location.id);
        Ok(location)
    }

    /// Partial update - only provided fields are modified
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateLocationRequest,
    ) -> Result<Location, TravelError> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations
            SET slug = COALESCE($1, slug),
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                country = COALESCE($4, country),
                region = COALESCE($5, region),
                latitude = COALESCE($6, latitude),
                longitude = COALESCE($7, longitude),
                visit_date = COALESCE($8, visit_date),
                sort_order = COALESCE($9, sort_order),
                updated_at = NOW()
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&req.slug)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.country)
        .bind(&req.region)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.visit_date)
        .bind(req.sort_order)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_db_error(req.slug.as_deref().unwrap_or("location"), e))?
        .ok_or_else(|| TravelError::NotFound(id.to_string()))?;

        log::info!("Updated location: {}", id);
        Ok(location)
    }

    /// Images cascade, photos and scenic content are detached by the schema
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), TravelError> {
        let rows = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| map_db_error("Delete location", e))?
            .rows_affected();

        if rows == 0 {
            return Err(TravelError::NotFound(id.to_string()));
        }

        log::info!("Deleted location: {}", id);
        Ok(())
    }

    pub async fn list_images(pool: &PgPool, location_id: Uuid) -> Result<Vec<LocationImage>, TravelError> {
        sqlx::query_as::<_, LocationImage>(
            r#"
            SELECT * FROM location_images
            WHERE location_id = $1
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(location_id)
        .fetch_all(pool)
        .await
        .map_err(|e| map_db_error("Fetch location images", e))
    }

    pub async fn add_image(
        pool: &PgPool,
        location_id: Uuid,
        req: &CreateLocationImageRequest,
    ) -> Result<LocationImage, TravelError> {
        // Verify location exists so a missing parent is a 404, not a FK error
        let _ = Self::get_by_id(pool, location_id).await?;

        sqlx::query_as::<_, LocationImage>(
            r#"
            INSERT INTO location_images (id, location_id, url, caption, sort_order, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(location_id)
        .bind(&req.url)
        .bind(&req.caption)
        .bind(req.sort_order.unwrap_or(0))
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("Create location image", e))
    }

    pub async fn delete_image(pool: &PgPool, location_id: Uuid, image_id: Uuid) -> Result<(), TravelError> {
        let rows = sqlx::query("DELETE FROM location_images WHERE id = $1 AND location_id = $2")
            .bind(image_id)
            .bind(location_id)
            .execute(pool)
            .await
            .map_err(|e| map_db_error("Delete location image", e))?
            .rows_affected();

        if rows == 0 {
            return Err(TravelError::NotFound(image_id.to_string()));
        }
        Ok(())
    }
}
