// src/db/store.rs
// DOCUMENTATION: Storage abstraction shared by all handlers
// PURPOSE: One async trait, implemented in memory and on PostgreSQL

use crate::errors::TravelError;
use crate::models::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Row counts for the admin dashboard
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StoreStats {
    pub locations: i64,
    pub location_images: i64,
    pub creators: i64,
    pub trip_photos: i64,
    pub total_likes: i64,
    pub pings: i64,
}

/// Persistence operations of the service
/// DOCUMENTATION: Both backends return the same error variants:
/// unknown ids -> NotFound, duplicate slug -> AlreadyExists,
/// dangling references -> InvalidInput
#[async_trait]
pub trait TravelStore: Send + Sync {
    // --- Locations ---
    async fn list_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, TravelError>;
    async fn get_location(&self, id: Uuid) -> Result<Location, TravelError>;
    async fn get_location_by_slug(&self, slug: &str) -> Result<Location, TravelError>;
    async fn create_location(&self, req: &CreateLocationRequest) -> Result<Location, TravelError>;
    async fn update_location(
        &self,
        id: Uuid,
        req: &UpdateLocationRequest,
    ) -> Result<Location, TravelError>;
    /// Deletes the location with its images; photos are detached
    async fn delete_location(&self, id: Uuid) -> Result<(), TravelError>;

    async fn list_location_images(&self, location_id: Uuid)
        -> Result<Vec<LocationImage>, TravelError>;
    async fn add_location_image(
        &self,
        location_id: Uuid,
        req: &CreateLocationImageRequest,
    ) -> Result<LocationImage, TravelError>;
    async fn delete_location_image(&self, location_id: Uuid, image_id: Uuid)
        -> Result<(), TravelError>;

    // --- Creators ---
    async fn list_creators(&self) -> Result<Vec<Creator>, TravelError>;
    async fn get_creator(&self, id: Uuid) -> Result<Creator, TravelError>;
    async fn create_creator(&self, req: &CreateCreatorRequest) -> Result<Creator, TravelError>;
    async fn delete_creator(&self, id: Uuid) -> Result<(), TravelError>;

    // --- Trip photos ---
    async fn insert_trip_photo(&self, photo: &NewTripPhoto) -> Result<TripPhoto, TravelError>;
    async fn get_trip_photo(&self, id: Uuid) -> Result<TripPhoto, TravelError>;
    /// Up to `fetch` photos after `after` in (created_at DESC, id DESC) order
    async fn page_trip_photos(
        &self,
        filter: &PhotoFilter,
        after: Option<&PhotoCursor>,
        fetch: i64,
    ) -> Result<Vec<TripPhoto>, TravelError>;
    /// Returns the new like count
    async fn like_trip_photo(&self, id: Uuid) -> Result<i64, TravelError>;
    /// Returns the new like count, never below zero
    async fn unlike_trip_photo(&self, id: Uuid) -> Result<i64, TravelError>;
    /// Returns the deleted row so its file can be removed
    async fn delete_trip_photo(&self, id: Uuid) -> Result<TripPhoto, TravelError>;

    // --- CMS content ---
    async fn list_hero_images(&self, only_active: bool) -> Result<Vec<HeroImage>, TravelError>;
    async fn create_hero_image(&self, req: &CreateHeroImageRequest)
        -> Result<HeroImage, TravelError>;
    async fn delete_hero_image(&self, id: Uuid) -> Result<(), TravelError>;

    async fn list_scenic_content(&self, location_id: Option<Uuid>)
        -> Result<Vec<ScenicContent>, TravelError>;
    async fn create_scenic_content(
        &self,
        req: &CreateScenicContentRequest,
    ) -> Result<ScenicContent, TravelError>;
    async fn delete_scenic_content(&self, id: Uuid) -> Result<(), TravelError>;

    async fn get_tour_settings(&self) -> Result<TourSettings, TravelError>;
    /// Merge `req` into the stored settings as one atomic step
    async fn update_tour_settings(
        &self,
        req: &UpdateTourSettingsRequest,
    ) -> Result<TourSettings, TravelError>;

    // --- GPS pings ---
    async fn insert_ping(&self, ping: &LocationPing) -> Result<LocationPing, TravelError>;
    async fn latest_ping(&self) -> Result<Option<LocationPing>, TravelError>;
    /// Pings in ascending recorded_at order; with a limit the newest `limit`
    async fn list_pings(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<LocationPing>, TravelError>;

    /// Aggregated without loading the pings
    async fn ping_summary(&self) -> Result<PingSummary, TravelError>;

    async fn stats(&self) -> Result<StoreStats, TravelError>;
}
