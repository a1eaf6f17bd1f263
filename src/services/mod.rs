// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod image_scraper;
pub mod location_service;
pub mod media_storage;
pub mod pagination;
pub mod photo_service;
pub mod rate_limiter;
pub mod trip_feed;

pub use image_scraper::*;
pub use location_service::*;
pub use media_storage::*;
pub use pagination::*;
pub use photo_service::*;
pub use rate_limiter::*;
pub use trip_feed::*;
