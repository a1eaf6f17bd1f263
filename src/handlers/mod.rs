// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Shared application state and route registration

pub mod admin;
pub mod content;
pub mod health;
pub mod locations;
pub mod media;
pub mod trip_feed;
pub mod trip_photos;

pub use admin::config as admin_config;
pub use content::config as content_config;
pub use health::config as health_config;
pub use locations::config as locations_config;
pub use media::config as media_config;
pub use trip_feed::config as trip_feed_config;
pub use trip_photos::config as trip_photos_config;

use crate::config::Config;
use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::services::{MediaStorage, RateLimiter};
use actix_web::web;
use std::sync::Arc;

/// Shared state handed to every worker
/// DOCUMENTATION: Each field is registered as its own `web::Data` so
/// handlers extract only what they need
#[derive(Clone)]
pub struct AppState {
    pub store: web::Data<dyn TravelStore>,
    pub config: web::Data<Config>,
    pub media: web::Data<MediaStorage>,
    pub rate_limiter: web::Data<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn TravelStore>) -> Self {
        let media = MediaStorage::new(
            config.media_dir.clone(),
            config.public_media_url.clone(),
            config.max_upload_bytes,
        );
        let rate_limiter = RateLimiter::new(config.ping_rate_limit, config.ping_rate_window_secs);

        Self {
            store: web::Data::from(store),
            config: web::Data::new(config),
            media: web::Data::new(media),
            rate_limiter: web::Data::new(rate_limiter),
        }
    }

    /// Register state, extractor error handlers and all routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.config.clone())
            .app_data(self.media.clone())
            .app_data(self.rate_limiter.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                log::warn!("Rejected JSON body: {}", err);
                TravelError::InvalidInput(format!("Ungültiger JSON-Body: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                TravelError::InvalidInput(format!("Ungültige Query-Parameter: {}", err)).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                TravelError::InvalidInput(format!("Ungültiger Pfad-Parameter: {}", err)).into()
            }));

        health_config(cfg);
        locations_config(cfg);
        trip_photos_config(cfg);
        media_config(cfg);
        content_config(cfg);
        trip_feed_config(cfg);
        admin_config(cfg);
    }
}
