// src/db/memory_store.rs
// DOCUMENTATION: In-memory store backend
// PURPOSE: Used without DATABASE_URL and by the test suite

use crate::db::{StoreStats, TravelStore};
use crate::errors::TravelError;
use crate::models::*;
use crate::services::haversine_km;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    locations: HashMap<Uuid, Location>,
    location_images: Vec<LocationImage>,
    creators: HashMap<Uuid, Creator>,
    trip_photos: HashMap<Uuid, TripPhoto>,
    hero_images: Vec<HeroImage>,
    scenic_content: Vec<ScenicContent>,
    tour_settings: TourSettings,
    pings: Vec<LocationPing>,
}

impl MemoryState {
    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.locations
            .values()
            .any(|l| l.slug == slug && Some(l.id) != except)
    }
}

/// Thread-safe store keeping everything in process memory
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TravelStore for MemoryStore {
    async fn list_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, TravelError> {
        let state = self.state.read().await;
        let mut locations: Vec<Location> = state
            .locations
            .values()
            .filter(|l| query.matches(l))
            .cloned()
            .collect();
        locations.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(locations)
    }

    async fn get_location(&self, id: Uuid) -> Result<Location, TravelError> {
        let state = self.state.read().await;
        state
            .locations
            .get(&id)
            .cloned()
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }

    async fn get_location_by_slug(&self, slug: &str) -> Result<Location, TravelError> {
        let state = self.state.read().await;
        state
            .locations
            .values()
            .find(|l| l.slug == slug)
            .cloned()
            .ok_or_else(|| TravelError::NotFound(slug.to_string()))
    }

    async fn create_location(&self, req: &CreateLocationRequest) -> Result<Location, TravelError> {
        let mut state = self.state.write().await;
        if state.slug_taken(&req.slug, None) {
            return Err(TravelError::AlreadyExists(req.slug.clone()));
        }

        let now = Utc::now();
        let location = Location {
            id: Uuid::new_v4(),
            slug: req.slug.clone(),
            name: req.name.clone(),
            description: req.description.clone(),
            country: req.country.clone(),
            region: req.region.clone(),
            latitude: req.latitude,
            longitude: req.longitude,
            visit_date: req.visit_date,
            sort_order: req.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };
        state.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn update_location(
        &self,
        id: Uuid,
        req: &UpdateLocationRequest,
    ) -> Result<Location, TravelError> {
        let mut state = self.state.write().await;
        if let Some(slug) = &req.slug {
            if state.slug_taken(slug, Some(id)) {
                return Err(TravelError::AlreadyExists(slug.clone()));
            }
        }

        let location = state
            .locations
            .get_mut(&id)
            .ok_or_else(|| TravelError::NotFound(id.to_string()))?;

        if let Some(slug) = &req.slug {
            location.slug = slug.clone();
        }
        if let Some(name) = &req.name {
            location.name = name.clone();
        }
        if req.description.is_some() {
            location.description = req.description.clone();
        }
        if req.country.is_some() {
            location.country = req.country.clone();
        }
        if req.region.is_some() {
            location.region = req.region.clone();
        }
        if let Some(lat) = req.latitude {
            location.latitude = lat;
        }
        if let Some(lon) = req.longitude {
            location.longitude = lon;
        }
        if req.visit_date.is_some() {
            location.visit_date = req.visit_date;
        }
        if let Some(order) = req.sort_order {
            location.sort_order = order;
        }
        location.updated_at = Utc::now();

        Ok(location.clone())
    }

    async fn delete_location(&self, id: Uuid) -> Result<(), TravelError> {
        let mut state = self.state.write().await;
        if state.locations.remove(&id).is_none() {
            return Err(TravelError::NotFound(id.to_string()));
        }

        state.location_images.retain(|img| img.location_id != id);
        for photo in state.trip_photos.values_mut() {
            if photo.location_id == Some(id) {
                photo.location_id = None;
            }
        }
        for content in state.scenic_content.iter_mut() {
            if content.location_id == Some(id) {
                content.location_id = None;
            }
        }
        Ok(())
    }

    async fn list_location_images(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<LocationImage>, TravelError> {
        let state = self.state.read().await;
        let mut images: Vec<LocationImage> = state
            .location_images
            .iter()
            .filter(|img| img.location_id == location_id)
            .cloned()
            .collect();
        images.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(images)
    }

    async fn add_location_image(
        &self,
        location_id: Uuid,
        req: &CreateLocationImageRequest,
    ) -> Result<LocationImage, TravelError> {
        let mut state = self.state.write().await;
        if !state.locations.contains_key(&location_id) {
            return Err(TravelError::NotFound(location_id.to_string()));
        }

        let image = LocationImage {
            id: Uuid::new_v4(),
            location_id,
            url: req.url.clone(),
            caption: req.caption.clone(),
            sort_order: req.sort_order.unwrap_or(0),
            created_at: Utc::now(),
        };
        state.location_images.push(image.clone());
        Ok(image)
    }

    async fn delete_location_image(
        &self,
        location_id: Uuid,
        image_id: Uuid,
    ) -> Result<(), TravelError> {
        let mut state = self.state.write().await;
        let before = state.location_images.len();
        state
            .location_images
            .retain(|img| !(img.id == image_id && img.location_id == location_id));

        if state.location_images.len() == before {
            return Err(TravelError::NotFound(image_id.to_string()));
        }
        Ok(())
    }

    async fn list_creators(&self) -> Result<Vec<Creator>, TravelError> {
        let state = self.state.read().await;
        let mut creators: Vec<Creator> = state.creators.values().cloned().collect();
        creators.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(creators)
    }

    async fn get_creator(&self, id: Uuid) -> Result<Creator, TravelError> {
        let state = self.state.read().await;
        state
            .creators
            .get(&id)
            .cloned()
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }

    async fn create_creator(&self, req: &CreateCreatorRequest) -> Result<Creator, TravelError> {
        let creator = Creator {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            avatar_url: req.avatar_url.clone(),
            instagram: req.instagram.clone(),
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .creators
            .insert(creator.id, creator.clone());
        Ok(creator)
    }

    async fn delete_creator(&self, id: Uuid) -> Result<(), TravelError> {
        let mut state = self.state.write().await;
        if state.creators.remove(&id).is_none() {
            return Err(TravelError::NotFound(id.to_string()));
        }
        for photo in state.trip_photos.values_mut() {
            if photo.creator_id == Some(id) {
                photo.creator_id = None;
            }
        }
        Ok(())
    }

    async fn insert_trip_photo(&self, photo: &NewTripPhoto) -> Result<TripPhoto, TravelError> {
        let mut state = self.state.write().await;

        if let Some(location_id) = photo.location_id {
            if !state.locations.contains_key(&location_id) {
                return Err(TravelError::InvalidInput(format!(
                    "Unbekannter Ort {}",
                    location_id
                )));
            }
        }
        if let Some(creator_id) = photo.creator_id {
            if !state.creators.contains_key(&creator_id) {
                return Err(TravelError::InvalidInput(format!(
                    "Unbekannter Ersteller {}",
                    creator_id
                )));
            }
        }

        let record = TripPhoto {
            id: photo.id,
            location_id: photo.location_id,
            creator_id: photo.creator_id,
            url: photo.url.clone(),
            storage_key: photo.storage_key.clone(),
            media_type: photo.media_type.as_str().to_string(),
            mime_type: photo.mime_type.clone(),
            file_size: photo.file_size,
            caption: photo.caption.clone(),
            likes: 0,
            taken_at: photo.taken_at,
            // same precision as timestamptz so cursors round-trip
            created_at: Utc::now().trunc_subsecs(6),
        };
        state.trip_photos.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_trip_photo(&self, id: Uuid) -> Result<TripPhoto, TravelError> {
        let state = self.state.read().await;
        state
            .trip_photos
            .get(&id)
            .cloned()
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }

    async fn page_trip_photos(
        &self,
        filter: &PhotoFilter,
        after: Option<&PhotoCursor>,
        fetch: i64,
    ) -> Result<Vec<TripPhoto>, TravelError> {
        let state = self.state.read().await;
        let mut photos: Vec<TripPhoto> = state
            .trip_photos
            .values()
            .filter(|p| filter.matches(p))
            .filter(|p| after.map_or(true, |c| c.is_before(p)))
            .cloned()
            .collect();

        photos.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        photos.truncate(fetch.max(0) as usize);
        Ok(photos)
    }

    async fn like_trip_photo(&self, id: Uuid) -> Result<i64, TravelError> {
        let mut state = self.state.write().await;
        let photo = state
            .trip_photos
            .get_mut(&id)
            .ok_or_else(|| TravelError::NotFound(id.to_string()))?;
        photo.likes += 1;
        Ok(photo.likes)
    }

    async fn unlike_trip_photo(&self, id: Uuid) -> Result<i64, TravelError> {
        let mut state = self.state.write().await;
        let photo = state
            .trip_photos
            .get_mut(&id)
            .ok_or_else(|| TravelError::NotFound(id.to_string()))?;
        photo.likes = (photo.likes - 1).max(0);
        Ok(photo.likes)
    }

    async fn delete_trip_photo(&self, id: Uuid) -> Result<TripPhoto, TravelError> {
        self.state
            .write()
            .await
            .trip_photos
            .remove(&id)
            .ok_or_else(|| TravelError::NotFound(id.to_string()))
    }

    async fn list_hero_images(&self, only_active: bool) -> Result<Vec<HeroImage>, TravelError> {
        let state = self.state.read().await;
        let mut images: Vec<HeroImage> = state
            .hero_images
            .iter()
            .filter(|h| !only_active || h.is_active)
            .cloned()
            .collect();
        images.sort_by_key(|h| (h.sort_order, h.created_at));
        Ok(images)
    }

    async fn create_hero_image(
        &self,
        req: &CreateHeroImageRequest,
    ) -> Result<HeroImage, TravelError> {
        let image = HeroImage {
            id: Uuid::new_v4(),
            url: req.url.clone(),
            title: req.title.clone(),
            subtitle: req.subtitle.clone(),
            sort_order: req.sort_order.unwrap_or(0),
            is_active: req.is_active.unwrap_or(true),
            created_at: Utc::now(),
        };
        self.state.write().await.hero_images.push(image.clone());
        Ok(image)
    }

    async fn delete_hero_image(&self, id: Uuid) -> Result<(), TravelError> {
        let mut state = self.state.write().await;
        let before = state.hero_images.len();
        state.hero_images.retain(|h| h.id != id);
        if state.hero_images.len() == before {
            return Err(TravelError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_scenic_content(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<ScenicContent>, TravelError> {
        let state = self.state.read().await;
        let mut content: Vec<ScenicContent> = state
            .scenic_content
            .iter()
            .filter(|c| location_id.map_or(true, |id| c.location_id == Some(id)))
            .cloned()
            .collect();
        content.sort_by_key(|c| (c.sort_order, c.created_at));
        Ok(content)
    }

    async fn create_scenic_content(
        &self,
        req: &CreateScenicContentRequest,
    ) -> Result<ScenicContent, TravelError> {
        let mut state = self.state.write().await;
        if let Some(location_id) = req.location_id {
            if !state.locations.contains_key(&location_id) {
                return Err(TravelError::InvalidInput(format!(
                    "Unbekannter Ort {}",
                    location_id
                )));
            }
        }

        let content = ScenicContent {
            id: Uuid::new_v4(),
            location_id: req.location_id,
            title: req.title.clone(),
            body: req.body.clone(),
            media_url: req.media_url.clone(),
            sort_order: req.sort_order.unwrap_or(0),
            created_at: Utc::now(),
        };
        state.scenic_content.push(content.clone());
        Ok(content)
    }

    async fn delete_scenic_content(&self, id: Uuid) -> Result<(), TravelError> {
        let mut state = self.state.write().await;
        let before = state.scenic_content.len();
        state.scenic_content.retain(|c| c.id != id);
        if state.scenic_content.len() == before {
            return Err(TravelError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn get_tour_settings(&self) -> Result<TourSettings, TravelError> {
        Ok(self.state.read().await.tour_settings.clone())
    }

    async fn update_tour_settings(
        &self,
        req: &UpdateTourSettingsRequest,
    ) -> Result<TourSettings, TravelError> {
        let mut state = self.state.write().await;
        state.tour_settings = req.merge(&state.tour_settings)?;
        Ok(state.tour_settings.clone())
    }

    async fn insert_ping(&self, ping: &LocationPing) -> Result<LocationPing, TravelError> {
        self.state.write().await.pings.push(ping.clone());
        Ok(ping.clone())
    }

    async fn latest_ping(&self) -> Result<Option<LocationPing>, TravelError> {
        let state = self.state.read().await;
        Ok(state
            .pings
            .iter()
            .max_by_key(|p| (p.recorded_at, p.created_at))
            .cloned())
    }

    async fn list_pings(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<LocationPing>, TravelError> {
        let state = self.state.read().await;
        let mut pings: Vec<LocationPing> = state
            .pings
            .iter()
            .filter(|p| since.map_or(true, |s| p.recorded_at >= s))
            .cloned()
            .collect();
        pings.sort_by_key(|p| (p.recorded_at, p.created_at));

        if let Some(limit) = limit {
            let keep = limit.max(0) as usize;
            if pings.len() > keep {
                pings.drain(..pings.len() - keep);
            }
        }
        Ok(pings)
    }

    async fn ping_summary(&self) -> Result<PingSummary, TravelError> {
        let state = self.state.read().await;
        let mut route: Vec<&LocationPing> = state.pings.iter().collect();
        route.sort_by_key(|p| (p.recorded_at, p.created_at));

        Ok(PingSummary {
            ping_count: route.len() as i64,
            total_distance_km: route
                .windows(2)
                .map(|pair| {
                    haversine_km(
                        (pair[0].latitude, pair[0].longitude),
                        (pair[1].latitude, pair[1].longitude),
                    )
                })
                .sum(),
        })
    }

    async fn stats(&self) -> Result<StoreStats, TravelError> {
        let state = self.state.read().await;
        Ok(StoreStats {
            locations: state.locations.len() as i64,
            location_images: state.location_images.len() as i64,
            creators: state.creators.len() as i64,
            trip_photos: state.trip_photos.len() as i64,
            total_likes: state.trip_photos.values().map(|p| p.likes).sum(),
            pings: state.pings.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn location_request(slug: &str) -> CreateLocationRequest {
        CreateLocationRequest {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            description: None,
            country: Some("Italien".to_string()),
            region: None,
            latitude: 43.77,
            longitude: 11.25,
            visit_date: None,
            sort_order: None,
        }
    }

    fn new_photo(location_id: Option<Uuid>) -> NewTripPhoto {
        let id = Uuid::new_v4();
        NewTripPhoto {
            id,
            location_id,
            creator_id: None,
            url: format!("/media/{}.jpg", id),
            storage_key: format!("{}.jpg", id),
            media_type: MediaType::Image,
            mime_type: "image/jpeg".to_string(),
            file_size: 42,
            caption: None,
            taken_at: None,
        }
    }

    fn ping_at(recorded_at: DateTime<Utc>, latitude: f64, longitude: f64) -> LocationPing {
        LocationPing {
            id: Uuid::new_v4(),
            latitude,
            longitude,
            accuracy_m: None,
            altitude_m: None,
            speed_kmh: None,
            heading: None,
            battery: None,
            note: None,
            recorded_at,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let store = MemoryStore::new();
        store.create_location(&location_request("florenz")).await.unwrap();

        let result = store.create_location(&location_request("florenz")).await;
        assert!(matches!(result, Err(TravelError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_update_slug_conflict() {
        let store = MemoryStore::new();
        store.create_location(&location_request("rom")).await.unwrap();
        let pisa = store.create_location(&location_request("pisa")).await.unwrap();

        let update = UpdateLocationRequest {
            slug: Some("rom".to_string()),
            ..Default::default()
        };
        let result = store.update_location(pisa.id, &update).await;
        assert!(matches!(result, Err(TravelError::AlreadyExists(_))));

        let rename = UpdateLocationRequest {
            name: Some("Pisa Turm".to_string()),
            ..Default::default()
        };
        let updated = store.update_location(pisa.id, &rename).await.unwrap();
        assert_eq!(updated.name, "Pisa Turm");
        assert_eq!(updated.slug, "pisa");
    }

    #[tokio::test]
    async fn test_delete_location_cascades() {
        let store = MemoryStore::new();
        let location = store.create_location(&location_request("siena")).await.unwrap();
        let image = CreateLocationImageRequest {
            url: "https://example.org/siena.jpg".to_string(),
            caption: None,
            sort_order: None,
        };
        store.add_location_image(location.id, &image).await.unwrap();
        let photo = store.insert_trip_photo(&new_photo(Some(location.id))).await.unwrap();

        store.delete_location(location.id).await.unwrap();

        assert!(store.list_location_images(location.id).await.unwrap().is_empty());
        let detached = store.get_trip_photo(photo.id).await.unwrap();
        assert_eq!(detached.location_id, None);
    }

    #[tokio::test]
    async fn test_photo_with_unknown_location() {
        let store = MemoryStore::new();
        let result = store.insert_trip_photo(&new_photo(Some(Uuid::new_v4()))).await;
        assert!(matches!(result, Err(TravelError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_likes_never_negative() {
        let store = MemoryStore::new();
        let photo = store.insert_trip_photo(&new_photo(None)).await.unwrap();

        assert_eq!(store.unlike_trip_photo(photo.id).await.unwrap(), 0);
        assert_eq!(store.like_trip_photo(photo.id).await.unwrap(), 1);
        assert_eq!(store.like_trip_photo(photo.id).await.unwrap(), 2);
        assert_eq!(store.unlike_trip_photo(photo.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_pings_keeps_newest() {
        let store = MemoryStore::new();
        let start = Utc::now() - Duration::hours(3);

        for i in 0..5 {
            let at = start + Duration::minutes(i * 10);
            store
                .insert_ping(&ping_at(at, 45.0 + i as f64 * 0.01, 9.0))
                .await
                .unwrap();
        }

        let last_two = store.list_pings(None, Some(2)).await.unwrap();
        assert_eq!(last_two.len(), 2);
        assert!(last_two[0].recorded_at < last_two[1].recorded_at);
        assert_eq!(last_two[1].recorded_at, start + Duration::minutes(40));

        let latest = store.latest_ping().await.unwrap().unwrap();
        assert_eq!(latest.recorded_at, start + Duration::minutes(40));
    }

    #[tokio::test]
    async fn test_ping_summary() {
        let store = MemoryStore::new();
        assert_eq!(store.ping_summary().await.unwrap(), PingSummary::default());

        let start = Utc::now() - Duration::hours(1);
        // inserted out of order; the route follows recorded_at
        for (minutes, lon) in [(20, 2.0), (0, 0.0), (10, 1.0)] {
            store
                .insert_ping(&ping_at(start + Duration::minutes(minutes), 0.0, lon))
                .await
                .unwrap();
        }

        let summary = store.ping_summary().await.unwrap();
        assert_eq!(summary.ping_count, 3);
        assert!((summary.total_distance_km - 222.4).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_concurrent_tour_settings_updates_keep_both_fields() {
        let store = std::sync::Arc::new(MemoryStore::new());

        let title = UpdateTourSettingsRequest {
            title: Some("Balkan 2026".to_string()),
            ..Default::default()
        };
        let live = UpdateTourSettingsRequest {
            is_live: Some(true),
            ..Default::default()
        };

        let (a, b) = tokio::join!(
            store.update_tour_settings(&title),
            store.update_tour_settings(&live)
        );
        a.unwrap();
        b.unwrap();

        let settings = store.get_tour_settings().await.unwrap();
        assert_eq!(settings.title, "Balkan 2026");
        assert!(settings.is_live);
    }

    #[tokio::test]
    async fn test_tour_settings_rejects_inverted_dates() {
        let store = MemoryStore::new();
        let update = UpdateTourSettingsRequest {
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 6, 1),
            end_date: chrono::NaiveDate::from_ymd_opt(2026, 5, 1),
            ..Default::default()
        };

        assert!(store.update_tour_settings(&update).await.is_err());
        assert_eq!(store.get_tour_settings().await.unwrap().start_date, None);
    }
}
