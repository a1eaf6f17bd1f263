// src/handlers/content.rs
// DOCUMENTATION: CMS content handlers
// PURPOSE: Public reads and admin writes for creators, hero images,
// scenic content and tour settings

use crate::config::Config;
use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::handlers::admin::{verify_admin_token, AdminAuth};
use crate::models::{
    CreateCreatorRequest, CreateHeroImageRequest, CreateScenicContentRequest, ScenicContentQuery,
    UpdateTourSettingsRequest,
};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct HeroImageQuery {
    /// Include inactive images (admin only)
    #[serde(default)]
    pub all: bool,
}

// --- Creators ---

/// GET /creators
pub async fn list_creators(store: web::Data<dyn TravelStore>) -> Result<impl Responder, TravelError> {
    Ok(HttpResponse::Ok().json(store.list_creators().await?))
}

/// GET /creators/{id}
pub async fn get_creator(
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    Ok(HttpResponse::Ok().json(store.get_creator(path.into_inner()).await?))
}

/// POST /creators
pub async fn create_creator(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    body: web::Json<CreateCreatorRequest>,
) -> Result<impl Responder, TravelError> {
    body.validate()?;

    let creator = store.create_creator(&body).await?;
    log::info!("Creator created: {} ({})", creator.name, creator.id);
    Ok(HttpResponse::Created().json(creator))
}

/// DELETE /creators/{id}
/// Their photos stay, without attribution
pub async fn delete_creator(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    store.delete_creator(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// --- Hero images ---

/// GET /hero-images
pub async fn list_hero_images(
    store: web::Data<dyn TravelStore>,
    config: web::Data<Config>,
    req: HttpRequest,
    query: web::Query<HeroImageQuery>,
) -> Result<impl Responder, TravelError> {
    if query.all {
        verify_admin_token(&req, &config)?;
    }

    let images = store.list_hero_images(!query.all).await?;
    Ok(HttpResponse::Ok().json(images))
}

/// POST /hero-images
pub async fn create_hero_image(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    body: web::Json<CreateHeroImageRequest>,
) -> Result<impl Responder, TravelError> {
    body.validate()?;

    let image = store.create_hero_image(&body).await?;
    Ok(HttpResponse::Created().json(image))
}

/// DELETE /hero-images/{id}
pub async fn delete_hero_image(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    store.delete_hero_image(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// --- Scenic content ---

/// GET /scenic-content?location_id=
pub async fn list_scenic_content(
    store: web::Data<dyn TravelStore>,
    query: web::Query<ScenicContentQuery>,
) -> Result<impl Responder, TravelError> {
    let content = store.list_scenic_content(query.location_id).await?;
    Ok(HttpResponse::Ok().json(content))
}

/// POST /scenic-content
pub async fn create_scenic_content(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    body: web::Json<CreateScenicContentRequest>,
) -> Result<impl Responder, TravelError> {
    body.validate()?;

    let content = store.create_scenic_content(&body).await?;
    Ok(HttpResponse::Created().json(content))
}

/// DELETE /scenic-content/{id}
pub async fn delete_scenic_content(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    store.delete_scenic_content(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// --- Tour settings ---

/// GET /tour-settings
pub async fn get_tour_settings(
    store: web::Data<dyn TravelStore>,
) -> Result<impl Responder, TravelError> {
    Ok(HttpResponse::Ok().json(store.get_tour_settings().await?))
}

/// PUT /tour-settings
/// Partial update of the singleton settings row
pub async fn update_tour_settings(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    body: web::Json<UpdateTourSettingsRequest>,
) -> Result<impl Responder, TravelError> {
    body.validate()?;

    let saved = store.update_tour_settings(&body).await?;
    log::info!("Tour settings updated (live: {})", saved.is_live);
    Ok(HttpResponse::Ok().json(saved))
}

/// Configuration for CMS content routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/creators")
            .route("", web::get().to(list_creators))
            .route("", web::post().to(create_creator))
            .route("/{id}", web::get().to(get_creator))
            .route("/{id}", web::delete().to(delete_creator)),
    )
    .service(
        web::scope("/hero-images")
            .route("", web::get().to(list_hero_images))
            .route("", web::post().to(create_hero_image))
            .route("/{id}", web::delete().to(delete_hero_image)),
    )
    .service(
        web::scope("/scenic-content")
            .route("", web::get().to(list_scenic_content))
            .route("", web::post().to(create_scenic_content))
            .route("/{id}", web::delete().to(delete_scenic_content)),
    )
    .route("/tour-settings", web::get().to(get_tour_settings))
    .route("/tour-settings", web::put().to(update_tour_settings));
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{admin, init_app, test_state};
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_creator_lifecycle() {
        let app = init_app!(test_state().await);

        let req = test::TestRequest::post()
            .uri("/creators")
            .set_json(json!({ "name": "Mara" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = admin(test::TestRequest::post().uri("/creators"))
            .set_json(json!({ "name": "Mara", "instagram": "mara.unterwegs" }))
            .to_request();
        let creator: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/creators/{}", creator["id"].as_str().unwrap());

        let req = test::TestRequest::get().uri(&uri).to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched["instagram"], "mara.unterwegs");

        let req = admin(test::TestRequest::delete().uri(&uri)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_auth_checked_before_body() {
        let app = init_app!(test_state().await);

        let req = test::TestRequest::post()
            .uri("/creators")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ kaputt")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::put()
            .uri("/tour-settings")
            .insert_header(("X-Admin-Token", "wrong"))
            .set_json(json!({ "is_live": "ja" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete().uri("/hero-images/not-a-uuid").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        // with the token the body error surfaces
        let req = admin(test::TestRequest::post().uri("/creators"))
            .insert_header(("content-type", "application/json"))
            .set_payload("{ kaputt")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_hero_images_hide_inactive() {
        let app = init_app!(test_state().await);

        for (url, active) in [("https://example.com/a.jpg", true), ("https://example.com/b.jpg", false)] {
            let req = admin(test::TestRequest::post().uri("/hero-images"))
                .set_json(json!({ "url": url, "is_active": active }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/hero-images").to_request();
        let public: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(public.as_array().unwrap().len(), 1);

        let req = test::TestRequest::get().uri("/hero-images?all=true").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = admin(test::TestRequest::get().uri("/hero-images?all=true")).to_request();
        let all: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_scenic_content_unknown_location() {
        let app = init_app!(test_state().await);

        let req = admin(test::TestRequest::post().uri("/scenic-content"))
            .set_json(json!({ "location_id": uuid::Uuid::new_v4(), "title": "Küstenweg" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_tour_settings_update() {
        let app = init_app!(test_state().await);

        let req = test::TestRequest::get().uri("/tour-settings").to_request();
        let settings: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(settings["title"], "Unsere Reise");

        let req = admin(test::TestRequest::put().uri("/tour-settings"))
            .set_json(json!({ "is_live": true, "start_date": "2026-06-01" }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["is_live"], true);
        assert_eq!(updated["title"], "Unsere Reise");

        let req = admin(test::TestRequest::put().uri("/tour-settings"))
            .set_json(json!({ "end_date": "2026-05-01" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
