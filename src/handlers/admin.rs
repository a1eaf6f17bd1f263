// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for maintenance operations
// PURPOSE: Image scraping for locations, store statistics, token check

use crate::config::Config;
use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::models::LocationImage;
use crate::services::{ImageScraper, LocationService, Platform, RateLimiter, DEFAULT_MAX_IMAGES};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

const DEFAULT_IMPORT_COUNT: usize = 5;
const MAX_IMPORT_COUNT: usize = 20;

/// Request body for the scrape endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeImagesRequest {
    /// Search term; defaults to "<name> <country>" of the location
    pub query: Option<String>,
    /// Images fetched per platform
    pub max_images: Option<usize>,
    /// How many of the best results become gallery images
    pub import: Option<usize>,
    pub platforms: Option<Vec<Platform>>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeImagesResponse {
    pub query: String,
    pub total_found: usize,
    pub imported: Vec<LocationImage>,
}

/// POST /admin/locations/{id}/scrape-images
/// Search social platforms and import the best images into the gallery
///
/// DOCUMENTATION: Requires admin authentication via X-Admin-Token header
pub async fn scrape_location_images(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
    body: Option<web::Json<ScrapeImagesRequest>>,
) -> Result<impl Responder, TravelError> {
    let location = store.get_location(path.into_inner()).await?;
    let body = body.map(|b| b.into_inner()).unwrap_or_default();

    let query = body
        .query
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| match &location.country {
            Some(country) => format!("{} {}", location.name, country),
            None => location.name.clone(),
        });
    let max_images = body.max_images.unwrap_or(DEFAULT_MAX_IMAGES).clamp(1, 100);
    let import = body
        .import
        .unwrap_or(DEFAULT_IMPORT_COUNT)
        .min(MAX_IMPORT_COUNT);
    let platforms = body.platforms.unwrap_or_else(|| Platform::ALL.to_vec());

    log::info!(
        "Admin image scrape for location {} with query '{}'",
        location.slug,
        query
    );

    let scraper = ImageScraper::new()?;
    let result = scraper.scrape(&query, max_images, &platforms).await;

    let imported =
        LocationService::import_scraped_images(store.get_ref(), location.id, &result.images, import)
            .await?;

    log::info!(
        "Image scrape for {} finished: {} found, {} imported",
        location.slug,
        result.total_images,
        imported.len()
    );

    Ok(HttpResponse::Ok().json(ScrapeImagesResponse {
        query: result.query,
        total_found: result.total_images,
        imported,
    }))
}

/// GET /admin/stats
/// Record counts and rate limiter state
pub async fn stats(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    config: web::Data<Config>,
    limiter: web::Data<RateLimiter>,
) -> Result<impl Responder, TravelError> {
    let store_stats = store.stats().await?;
    let limiter_stats = limiter.stats().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "store": store_stats,
        "ping_rate_limiter": limiter_stats,
        "storage_backend": if config.database_url.is_some() { "postgres" } else { "memory" },
    })))
}

/// Helper function to verify admin authentication
/// DOCUMENTATION: Checks X-Admin-Token header against configured admin token
pub(crate) fn verify_admin_token(req: &HttpRequest, config: &Config) -> Result<(), TravelError> {
    let token = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            log::warn!("Admin request without token: {}", req.path());
            TravelError::Unauthorized
        })?;

    if token != config.admin_token {
        log::warn!("Admin request with invalid token: {}", req.path());
        return Err(TravelError::Forbidden);
    }

    Ok(())
}

/// Extractor for admin-only handlers
/// DOCUMENTATION: Declared as the first handler argument so the token is
/// checked before the body or path is parsed
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = TravelError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<Config>>() {
            Some(config) => verify_admin_token(req, config).map(|_| AdminAuth),
            None => {
                log::error!("Config missing from app data");
                Err(TravelError::InternalError)
            }
        };
        ready(result)
    }
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route(
                "/locations/{id}/scrape-images",
                web::post().to(scrape_location_images),
            )
            .route("/stats", web::get().to(stats)),
    );
}
