// src/db/pg_store.rs
// DOCUMENTATION: PostgreSQL store backend
// PURPOSE: Implements TravelStore by delegating to the repositories

use crate::db::{
    ContentRepository, LocationRepository, PhotoRepository, PingRepository, StoreStats,
    TravelStore,
};
use crate::errors::TravelError;
use crate::models::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Map a sqlx error to the application error
/// DOCUMENTATION: Unique violations become AlreadyExists(context),
/// everything else is logged and reported as a database error
pub(crate) fn map_db_error(context: &str, e: sqlx::Error) -> TravelError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            log::warn!("Unique constraint violated: {}", context);
            TravelError::AlreadyExists(context.to_string())
        }
        other => {
            log::error!("{} failed: {}", context, other);
            TravelError::DatabaseError(format!("{} failed", context))
        }
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TravelStore for PgStore {
    async fn list_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, TravelError> {
        LocationRepository::list(&self.pool, query).await
    }

    async fn get_location(&self, id: Uuid) -> Result<Location, TravelError> {
        LocationRepository::get_by_id(&self.pool, id).await
    }

    async fn get_location_by_slug(&self, slug: &str) -> Result<Location, TravelError> {
        LocationRepository::get_by_slug(&self.pool, slug).await
    }

    async fn create_location(&self, req: &CreateLocationRequest) -> Result<Location, TravelError> {
        LocationRepository::create(&self.pool, req).await
    }

    async fn update_location(
        &self,
        id: Uuid,
        req: &UpdateLocationRequest,
    ) -> Result<Location, TravelError> {
        LocationRepository::update(&self.pool, id, req).await
    }

    async fn delete_location(&self, id: Uuid) -> Result<(), TravelError> {
        LocationRepository::delete(&self.pool, id).await
    }

    async fn list_location_images(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<LocationImage>, TravelError> {
        LocationRepository::list_images(&self.pool, location_id).await
    }

    async fn add_location_image(
        &self,
        location_id: Uuid,
        req: &CreateLocationImageRequest,
    ) -> Result<LocationImage, TravelError> {
        LocationRepository::add_image(&self.pool, location_id, req).await
    }

    async fn delete_location_image(
        &self,
        location_id: Uuid,
        image_id: Uuid,
    ) -> Result<(), TravelError> {
        LocationRepository::delete_image(&self.pool, location_id, image_id).await
    }

    async fn list_creators(&self) -> Result<Vec<Creator>, TravelError> {
        ContentRepository::list_creators(&self.pool).await
    }

    async fn get_creator(&self, id: Uuid) -> Result<Creator, TravelError> {
        ContentRepository::get_creator(&self.pool, id).await
    }

    async fn create_creator(&self, req: &CreateCreatorRequest) -> Result<Creator, TravelError> {
        ContentRepository::create_creator(&self.pool, req).await
    }

    async fn delete_creator(&self, id: Uuid) -> Result<(), TravelError> {
        ContentRepository::delete_creator(&self.pool, id).await
    }

    async fn insert_trip_photo(&self, photo: &NewTripPhoto) -> Result<TripPhoto, TravelError> {
        PhotoRepository::create_photo(&self.pool, photo).await
    }

    async fn get_trip_photo(&self, id: Uuid) -> Result<TripPhoto, TravelError> {
        PhotoRepository::get_photo(&self.pool, id).await
    }

    async fn page_trip_photos(
        &self,
        filter: &PhotoFilter,
        after: Option<&PhotoCursor>,
        fetch: i64,
    ) -> Result<Vec<TripPhoto>, TravelError> {
        PhotoRepository::page_photos(&self.pool, filter, after, fetch).await
    }

    async fn like_trip_photo(&self, id: Uuid) -> Result<i64, TravelError> {
        PhotoRepository::like_photo(&self.pool, id).await
    }

    async fn unlike_trip_photo(&self, id: Uuid) -> Result<i64, TravelError> {
        PhotoRepository::unlike_photo(&self.pool, id).await
    }

    async fn delete_trip_photo(&self, id: Uuid) -> Result<TripPhoto, TravelError> {
        PhotoRepository::delete_photo(&self.pool, id).await
    }

    async fn list_hero_images(&self, only_active: bool) -> Result<Vec<HeroImage>, TravelError> {
        ContentRepository::list_hero_images(&self.pool, only_active).await
    }

    async fn create_hero_image(
        &self,
        req: &CreateHeroImageRequest,
    ) -> Result<HeroImage, TravelError> {
        ContentRepository::create_hero_image(&self.pool, req).await
    }

    async fn delete_hero_image(&self, id: Uuid) -> Result<(), TravelError> {
        ContentRepository::delete_hero_image(&self.pool, id).await
    }

    async fn list_scenic_content(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<ScenicContent>, TravelError> {
        ContentRepository::list_scenic_content(&self.pool, location_id).await
    }

    async fn create_scenic_content(
        &self,
        req: &CreateScenicContentRequest,
    ) -> Result<ScenicContent, TravelError> {
        ContentRepository::create_scenic_content(&self.pool, req).await
    }

    async fn delete_scenic_content(&self, id: Uuid) -> Result<(), TravelError> {
        ContentRepository::delete_scenic_content(&self.pool, id).await
    }

    async fn get_tour_settings(&self) -> Result<TourSettings, TravelError> {
        ContentRepository::get_tour_settings(&self.pool).await
    }

    async fn update_tour_settings(
        &self,
        req: &UpdateTourSettingsRequest,
    ) -> Result<TourSettings, TravelError> {
        ContentRepository::update_tour_settings(&self.pool, req).await
    }

    async fn insert_ping(&self, ping: &LocationPing) -> Result<LocationPing, TravelError> {
        PingRepository::insert(&self.pool, ping).await
    }

    async fn latest_ping(&self) -> Result<Option<LocationPing>, TravelError> {
        PingRepository::latest(&self.pool).await
    }

    async fn list_pings(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<LocationPing>, TravelError> {
        PingRepository::list(&self.pool, since, limit).await
    }

    async fn ping_summary(&self) -> Result<PingSummary, TravelError> {
        PingRepository::summary(&self.pool).await
    }

    async fn stats(&self) -> Result<StoreStats, TravelError> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM locations),
                (SELECT COUNT(*) FROM location_images),
                (SELECT COUNT(*) FROM creators),
                (SELECT COUNT(*) FROM trip_photos),
                (SELECT COALESCE(SUM(likes), 0)::BIGINT FROM trip_photos),
                (SELECT COUNT(*) FROM location_pings)
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Statistics", e))?;

        Ok(StoreStats {
            locations: row.0,
            location_images: row.1,
            creators: row.2,
            trip_photos: row.3,
            total_likes: row.4,
            pings: row.5,
        })
    }
}
