// src/services/location_service.rs
// DOCUMENTATION: Business logic for the location catalog
// PURPOSE: Intermediary between handlers and the store

use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::models::{
    CreateLocationImageRequest, CreateLocationRequest, Location, LocationDetailResponse,
    LocationImage, UpdateLocationRequest,
};
use crate::services::image_scraper::ScrapedImage;
use std::collections::HashSet;
use uuid::Uuid;

pub struct LocationService;

impl LocationService {
    /// Get a location by UUID or slug, with its gallery and stories
    pub async fn get_detail(
        store: &dyn TravelStore,
        identifier: &str,
    ) -> Result<LocationDetailResponse, TravelError> {
        let location = match Uuid::parse_str(identifier) {
            Ok(id) => store.get_location(id).await?,
            Err(_) => store.get_location_by_slug(identifier).await?,
        };

        let images = store.list_location_images(location.id).await?;
        let scenic_content = store.list_scenic_content(Some(location.id)).await?;

        Ok(LocationDetailResponse {
            location,
            images,
            scenic_content,
        })
    }

    pub async fn create(
        store: &dyn TravelStore,
        req: &CreateLocationRequest,
    ) -> Result<Location, TravelError> {
        let location = store.create_location(req).await?;
        log::info!("Location created: {} ({})", location.slug, location.id);
        Ok(location)
    }

    /// Partial update; an empty body is rejected
    pub async fn update(
        store: &dyn TravelStore,
        id: Uuid,
        req: &UpdateLocationRequest,
    ) -> Result<Location, TravelError> {
        let empty = req.slug.is_none()
            && req.name.is_none()
            && req.description.is_none()
            && req.country.is_none()
            && req.region.is_none()
            && req.latitude.is_none()
            && req.longitude.is_none()
            && req.visit_date.is_none()
            && req.sort_order.is_none();

        if empty {
            return Err(TravelError::InvalidInput(
                "Keine Felder zum Aktualisieren angegeben".to_string(),
            ));
        }

        store.update_location(id, req).await
    }

    /// Add up to `limit` scraped images to the gallery of `location_id`
    /// DOCUMENTATION: `images` are expected best first. URLs already in the
    /// gallery are skipped and new images are appended after the current last
    /// sort position. A failed insert is logged and does not stop the import.
    pub async fn import_scraped_images(
        store: &dyn TravelStore,
        location_id: Uuid,
        images: &[ScrapedImage],
        limit: usize,
    ) -> Result<Vec<LocationImage>, TravelError> {
        let existing = store.list_location_images(location_id).await?;
        let mut next_order = existing.iter().map(|i| i.sort_order).max().unwrap_or(-1) + 1;
        let mut seen: HashSet<String> = existing.into_iter().map(|i| i.url).collect();

        let mut imported = Vec::new();
        for image in images {
            if imported.len() >= limit {
                break;
            }
            if !seen.insert(image.url.clone()) {
                continue;
            }

            let request = CreateLocationImageRequest {
                url: image.url.clone(),
                caption: Some(image.caption()),
                sort_order: Some(next_order),
            };

            match store.add_location_image(location_id, &request).await {
                Ok(created) => {
                    imported.push(created);
                    next_order += 1;
                }
                Err(e) => log::warn!("Could not import {}: {}", image.url, e),
            }
        }

        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::CreateScenicContentRequest;
    use crate::services::image_scraper::Platform;

    async fn store_with_location() -> (MemoryStore, Location) {
        let store = MemoryStore::new();
        let location = LocationService::create(
            &store,
            &CreateLocationRequest {
                slug: "kyoto".to_string(),
                name: "Kyoto".to_string(),
                description: Some("Tempel und Gärten".to_string()),
                country: Some("Japan".to_string()),
                region: None,
                latitude: 35.01,
                longitude: 135.77,
                visit_date: None,
                sort_order: Some(3),
            },
        )
        .await
        .unwrap();
        (store, location)
    }

    #[tokio::test]
    async fn test_detail_by_slug_and_id() {
        let (store, location) = store_with_location().await;
        store
            .add_location_image(
                location.id,
                &CreateLocationImageRequest {
                    url: "https://example.org/kyoto.jpg".to_string(),
                    caption: Some("Fushimi Inari".to_string()),
                    sort_order: None,
                },
            )
            .await
            .unwrap();
        store
            .create_scenic_content(&CreateScenicContentRequest {
                location_id: Some(location.id),
                title: "Morgens im Bambuswald".to_string(),
                body: None,
                media_url: None,
                sort_order: None,
            })
            .await
            .unwrap();

        let by_slug = LocationService::get_detail(&store, "kyoto").await.unwrap();
        assert_eq!(by_slug.location.id, location.id);
        assert_eq!(by_slug.images.len(), 1);
        assert_eq!(by_slug.scenic_content.len(), 1);

        let by_id = LocationService::get_detail(&store, &location.id.to_string())
            .await
            .unwrap();
        assert_eq!(by_id.location.slug, "kyoto");
    }

    #[tokio::test]
    async fn test_unknown_identifier() {
        let (store, _) = store_with_location().await;
        let result = LocationService::get_detail(&store, "osaka").await;
        assert!(matches!(result, Err(TravelError::NotFound(_))));
    }

    fn scraped(url: &str, score: i64) -> ScrapedImage {
        ScrapedImage {
            url: url.to_string(),
            title: Some("Philosophenweg".to_string()),
            author: Some("hana".to_string()),
            author_url: None,
            platform: Platform::Reddit,
            score,
            timestamp: None,
            source_url: None,
        }
    }

    #[tokio::test]
    async fn test_import_skips_known_urls_and_continues_order() {
        let (store, location) = store_with_location().await;
        store
            .add_location_image(
                location.id,
                &CreateLocationImageRequest {
                    url: "https://i.redd.it/known.jpg".to_string(),
                    caption: None,
                    sort_order: Some(4),
                },
            )
            .await
            .unwrap();

        let images = vec![
            scraped("https://i.redd.it/best.jpg", 900),
            scraped("https://i.redd.it/known.jpg", 500),
            scraped("https://i.redd.it/best.jpg", 400),
            scraped("https://i.redd.it/second.jpg", 300),
            scraped("https://i.redd.it/third.jpg", 200),
        ];

        let imported = LocationService::import_scraped_images(&store, location.id, &images, 2)
            .await
            .unwrap();

        let urls: Vec<_> = imported.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://i.redd.it/best.jpg", "https://i.redd.it/second.jpg"]);
        assert_eq!(
            imported.iter().map(|i| i.sort_order).collect::<Vec<_>>(),
            vec![5, 6]
        );
        assert_eq!(
            imported[0].caption.as_deref(),
            Some("Philosophenweg (Foto: hana via Reddit)")
        );
        assert_eq!(store.list_location_images(location.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_import_limit_larger_than_results() {
        let (store, location) = store_with_location().await;
        let images = vec![scraped("https://i.redd.it/a.jpg", 2), scraped("https://i.redd.it/b.jpg", 1)];

        let imported = LocationService::import_scraped_images(&store, location.id, &images, 20)
            .await
            .unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].sort_order, 0);

        // a second run finds nothing new
        let again = LocationService::import_scraped_images(&store, location.id, &images, 20)
            .await
            .unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_import_into_unknown_location() {
        let (store, _) = store_with_location().await;
        let images = vec![scraped("https://i.redd.it/a.jpg", 1)];
        let imported = LocationService::import_scraped_images(&store, Uuid::new_v4(), &images, 5)
            .await
            .unwrap();
        assert!(imported.is_empty());
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let (store, location) = store_with_location().await;
        let result =
            LocationService::update(&store, location.id, &UpdateLocationRequest::default()).await;
        assert!(matches!(result, Err(TravelError::InvalidInput(_))));
    }
}
