// src/services/pagination.rs
// DOCUMENTATION: Cursor paging and day grouping of the photo feed
// PURPOSE: Backend-independent page assembly

use crate::models::{PhotoDayGroup, TripPhoto, TripPhotoPage};

pub const DEFAULT_PAGE_SIZE: i64 = 24;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Requested page size clamped to 1..=MAX_PAGE_SIZE
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Build a page from up to `limit + 1` fetched rows
/// DOCUMENTATION: The extra row only signals that another page exists
pub fn into_page(mut rows: Vec<TripPhoto>, limit: i64) -> TripPhotoPage {
    let limit = limit.max(1) as usize;
    let has_more = rows.len() > limit;
    rows.truncate(limit);

    let next_cursor = if has_more {
        rows.last().map(|p| p.cursor().encode())
    } else {
        None
    };

    TripPhotoPage {
        items: rows,
        next_cursor,
        has_more,
    }
}

/// Group consecutive photos sharing a display date
pub fn group_by_day(photos: Vec<TripPhoto>) -> Vec<PhotoDayGroup> {
    let mut groups: Vec<PhotoDayGroup> = Vec::new();

    for photo in photos {
        let date = photo.display_date();
        match groups.last_mut() {
            Some(group) if group.date == date => group.photos.push(photo),
            _ => groups.push(PhotoDayGroup {
                date,
                photos: vec![photo],
            }),
        }
    }

    groups
}
