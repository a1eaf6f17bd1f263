// src/db/content_repository.rs
// DOCUMENTATION: CMS content database operations
// PURPOSE: Creators, hero images, scenic content and tour settings

use crate::db::pg_store::map_db_error;
use crate::errors::TravelError;
use crate::models::*;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ContentRepository;

impl ContentRepository {
    pub async fn list_creators(pool: &PgPool) -> Result<Vec<Creator>, TravelError> {
        sqlx::query_as::<_, Creator>("SELECT * FROM creators ORDER BY name ASC")
            .fetch_all(pool)
            .await
            .map_err(|e| map_db_error("List creators", e))
    }

    pub async fn get_creator(pool: &PgPool, id: Uuid) -> Result<Creator, TravelError> {
        sqlx::query_as::<_, Creator>("SELECT * FROM creators WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| map_db_error("Fetch creator", e))?
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }

    pub async fn create_creator(pool: &PgPool, req: &CreateCreatorRequest) -> Result<Creator, TravelError> {
        sqlx::query_as::<_, Creator>(
            r#"
            INSERT INTO creators (id, name, avatar_url, instagram, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.avatar_url)
        .bind(&req.instagram)
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("Create creator", e))
    }

    pub async fn delete_creator(pool: &PgPool, id: Uuid) -> Result<(), TravelError> {
        Self::delete_by_id(pool, "DELETE FROM creators WHERE id = $1", id).await
    }

    pub async fn list_hero_images(pool: &PgPool, only_active: bool) -> Result<Vec<HeroImage>, TravelError> {
        sqlx::query_as::<_, HeroImage>(
            r#"
            SELECT * FROM hero_images
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(only_active)
        .fetch_all(pool)
        .await
        .map_err(|e| map_db_error("List hero images", e))
    }

    pub async fn create_hero_image(pool: &PgPool, req: &CreateHeroImageRequest) -> Result<HeroImage, TravelError> {
        sqlx::query_as::<_, HeroImage>(
            r#"
            INSERT INTO hero_images (id, url, title, subtitle, sort_order, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.url)
        .bind(&req.title)
        .bind(&req.subtitle)
        .bind(req.sort_order.unwrap_or(0))
        .bind(req.is_active.unwrap_or(true))
        .fetch_one(pool)
        .await
        .map_err(|e| map_db_error("Create hero image", e))
    }

    pub async fn delete_hero_image(pool: &PgPool, id: Uuid) -> Result<(), TravelError> {
        Self::delete_by_id(pool, "DELETE FROM hero_images WHERE id = $1", id).await
    }

    pub async fn list_scenic_content(
        pool: &PgPool,
        location_id: Option<Uuid>,
    ) -> Result<Vec<ScenicContent>, TravelError> {
        sqlx::query_as::<_, ScenicContent>(
            r#"
            SELECT * FROM scenic_content
            WHERE ($1::uuid IS NULL OR location_id = $1)
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(location_id)
        .fetch_all(pool)
        .await
        .map_err(|e| map_db_error("List scenic content", e))
    }

    pub async fn create_scenic_content(
        pool: &PgPool,
        req: &CreateScenicContentRequest,
    ) -> Result<ScenicContent, TravelError> {
        sqlx::query_as::<_, ScenicContent>(
            r#"
            INSERT INTO scenic_content (id, location_id, title, body, media_url, sort_order, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.location_id)
        .bind(&req.title)
        .bind(&req.body)
        .bind(&req.media_url)
        .bind(req.sort_order.unwrap_or(0))
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                TravelError::InvalidInput("Unbekannter Ort".to_string())
            }
            other => map_db_error("Create scenic content", other),
        })
    }

    pub async fn delete_scenic_content(pool: &PgPool, id: Uuid) -> Result<(), TravelError> {
        Self::delete_by_id(pool, "DELETE FROM scenic_content WHERE id = $1", id).await
    }

    /// The migration seeds the single row, so it is always present
    pub async fn get_tour_settings(pool: &PgPool) -> Result<TourSettings, TravelError> {
        sqlx::query_as::<_, TourSettings>(
            "SELECT title, subtitle, start_date, end_date, is_live, updated_at FROM tour_settings WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
        .map_err(|e| map_db_error("Fetch tour settings", e))
        .map(|row| row.unwrap_or_default())
    }

    /// Read-merge-write under a row lock so concurrent updates do not drop fields
    pub async fn update_tour_settings(
        pool: &PgPool,
        req: &UpdateTourSettingsRequest,
    ) -> Result<TourSettings, TravelError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| map_db_error("Begin tour settings update", e))?;

        let current = sqlx::query_as::<_, TourSettings>(
            "SELECT title, subtitle, start_date, end_date, is_live, updated_at FROM tour_settings WHERE id = 1 FOR UPDATE",
        )
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error("Lock tour settings", e))?
        .unwrap_or_default();

        let settings = req.merge(&current)?;

        let saved = sqlx::query_as::<_, TourSettings>(
            r#"
            INSERT INTO tour_settings (id, title, subtitle, start_date, end_date, is_live, updated_at)
            VALUES (1, $1, $2, $3, $4, $5, NOW())
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                subtitle = EXCLUDED.subtitle,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                is_live = EXCLUDED.is_live,
                updated_at = NOW()
            RETURNING title, subtitle, start_date, end_date, is_live, updated_at
            "#,
        )
        .bind(&settings.title)
        .bind(&settings.subtitle)
        .bind(settings.start_date)
        .bind(settings.end_date)
        .bind(settings.is_live)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("Save tour settings", e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Commit tour settings", e))?;

        Ok(saved)
    }

    async fn delete_by_id(pool: &PgPool, sql: &'static str, id: Uuid) -> Result<(), TravelError> {
        let rows = sqlx::query(sql)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| map_db_error("Delete", e))?
            .rows_affected();

        if rows == 0 {
            return Err(TravelError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
