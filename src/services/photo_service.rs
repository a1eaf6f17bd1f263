// src/services/photo_service.rs
// DOCUMENTATION: Business logic for trip photos
// PURPOSE: Feed paging, day grouping, upload registration and likes

use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::models::{
    GroupedTripPhotoPage, LikeResponse, NewTripPhoto, PhotoCursor, PhotoFilter, PhotoPageQuery,
    TripPhoto, TripPhotoPage,
};
use crate::services::pagination::{clamp_limit, group_by_day, into_page};
use crate::services::MediaStorage;
use uuid::Uuid;

pub struct PhotoService;

impl PhotoService {
    /// One page of the photo feed, newest first
    pub async fn page(
        store: &dyn TravelStore,
        query: &PhotoPageQuery,
    ) -> Result<TripPhotoPage, TravelError> {
        let limit = clamp_limit(query.limit);
        let cursor = query
            .cursor
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(PhotoCursor::decode)
            .transpose()?;

        let filter = PhotoFilter {
            location_id: query.location_id,
            creator_id: query.creator_id,
            media_type: query.media_type,
        };

        let rows = store
            .page_trip_photos(&filter, cursor.as_ref(), limit + 1)
            .await?;

        Ok(into_page(rows, limit))
    }

    /// Same page, grouped by day
    pub async fn grouped_page(
        store: &dyn TravelStore,
        query: &PhotoPageQuery,
    ) -> Result<GroupedTripPhotoPage, TravelError> {
        let page = Self::page(store, query).await?;

        Ok(GroupedTripPhotoPage {
            groups: group_by_day(page.items),
            next_cursor: page.next_cursor,
            has_more: page.has_more,
        })
    }

    /// Insert the row for an already stored file
    /// DOCUMENTATION: The file is removed again if the insert fails so no
    /// orphaned media stays behind
    pub async fn register_upload(
        store: &dyn TravelStore,
        media: &MediaStorage,
        photo: NewTripPhoto,
    ) -> Result<TripPhoto, TravelError> {
        match store.insert_trip_photo(&photo).await {
            Ok(record) => {
                log::info!(
                    "Trip photo {} uploaded ({}, {} bytes)",
                    record.id,
                    record.mime_type,
                    record.file_size
                );
                Ok(record)
            }
            Err(e) => {
                log::warn!("Upload {} rejected: {}", photo.id, e);
                media.remove(&photo.storage_key).await;
                Err(e)
            }
        }
    }

    pub async fn like(store: &dyn TravelStore, id: Uuid) -> Result<LikeResponse, TravelError> {
        let likes = store.like_trip_photo(id).await?;
        Ok(LikeResponse { id, likes })
    }

    pub async fn unlike(store: &dyn TravelStore, id: Uuid) -> Result<LikeResponse, TravelError> {
        let likes = store.unlike_trip_photo(id).await?;
        Ok(LikeResponse { id, likes })
    }

    /// Delete the row and its media file
    pub async fn delete(
        store: &dyn TravelStore,
        media: &MediaStorage,
        id: Uuid,
    ) -> Result<(), TravelError> {
        let photo = store.delete_trip_photo(id).await?;
        media.remove(&photo.storage_key).await;
        log::info!("Deleted trip photo {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{CreateLocationRequest, MediaType};
    use std::collections::HashSet;

    fn new_photo(location_id: Option<Uuid>, media_type: MediaType) -> NewTripPhoto {
        let id = Uuid::new_v4();
        NewTripPhoto {
            id,
            location_id,
            creator_id: None,
            url: format!("/media/{}", id),
            storage_key: id.to_string(),
            media_type,
            mime_type: "image/jpeg".to_string(),
            file_size: 10,
            caption: None,
            taken_at: None,
        }
    }

    async fn seeded_store(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for _ in 0..count {
            store
                .insert_trip_photo(&new_photo(None, MediaType::Image))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_pages_cover_feed_without_overlap() {
        let store = seeded_store(11).await;
        let full = store
            .page_trip_photos(&PhotoFilter::default(), None, 100)
            .await
            .unwrap();

        let mut seen = Vec::new();
        let mut query = PhotoPageQuery {
            limit: Some(4),
            ..Default::default()
        };
        let mut pages = 0;

        loop {
            let page = PhotoService::page(&store, &query).await.unwrap();
            pages += 1;
            seen.extend(page.items.iter().map(|p| p.id));

            match page.next_cursor {
                Some(cursor) => query.cursor = Some(cursor),
                None => {
                    assert!(!page.has_more);
                    break;
                }
            }
        }

        assert_eq!(pages, 3);
        let expected: Vec<Uuid> = full.iter().map(|p| p.id).collect();
        assert_eq!(seen, expected);
        assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 11);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_trailing_cursor() {
        let store = seeded_store(4).await;
        let query = PhotoPageQuery {
            limit: Some(4),
            ..Default::default()
        };

        let page = PhotoService::page(&store, &query).await.unwrap();
        assert_eq!(page.items.len(), 4);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_malformed_cursor_is_invalid_input() {
        let store = seeded_store(1).await;
        let query = PhotoPageQuery {
            cursor: Some("kaputt".to_string()),
            ..Default::default()
        };

        let result = PhotoService::page(&store, &query).await;
        assert!(matches!(result, Err(TravelError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_filters_apply() {
        let store = MemoryStore::new();
        let location = store
            .create_location(&CreateLocationRequest {
                slug: "wien".to_string(),
                name: "Wien".to_string(),
                description: None,
                country: Some("Österreich".to_string()),
                region: None,
                latitude: 48.2,
                longitude: 16.37,
                visit_date: None,
                sort_order: None,
            })
            .await
            .unwrap();

        store
            .insert_trip_photo(&new_photo(Some(location.id), MediaType::Image))
            .await
            .unwrap();
        store
            .insert_trip_photo(&new_photo(Some(location.id), MediaType::Video))
            .await
            .unwrap();
        store
            .insert_trip_photo(&new_photo(None, MediaType::Image))
            .await
            .unwrap();

        let by_location = PhotoPageQuery {
            location_id: Some(location.id),
            ..Default::default()
        };
        assert_eq!(PhotoService::page(&store, &by_location).await.unwrap().items.len(), 2);

        let videos = PhotoPageQuery {
            location_id: Some(location.id),
            media_type: Some(MediaType::Video),
            ..Default::default()
        };
        let page = PhotoService::page(&store, &videos).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].media_type, "video");
    }

    #[tokio::test]
    async fn test_failed_registration_removes_file() {
        let store = MemoryStore::new();
        let root = std::env::temp_dir().join(format!("photo-service-{}", Uuid::new_v4()));
        let media = MediaStorage::new(root, "/media".to_string(), 1024);
        media.ensure_root().await.unwrap();

        let mut photo = new_photo(Some(Uuid::new_v4()), MediaType::Image);
        photo.storage_key = "orphan.jpg".to_string();
        let path = media.resolve("orphan.jpg").unwrap();
        tokio::fs::write(&path, b"jpeg").await.unwrap();

        let result = PhotoService::register_upload(&store, &media, photo).await;
        assert!(matches!(result, Err(TravelError::InvalidInput(_))));
        assert!(!path.exists());
    }
}
