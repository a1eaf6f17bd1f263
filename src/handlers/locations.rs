// src/handlers/locations.rs
// DOCUMENTATION: HTTP handlers for the location catalog
// PURPOSE: Parse requests, call services, return responses

use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::handlers::admin::AdminAuth;
use crate::models::{
    CreateLocationImageRequest, CreateLocationRequest, LocationQuery, UpdateLocationRequest,
};
use crate::services::LocationService;
use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// GET /locations
/// List locations, optionally filtered by country or name
pub async fn list_locations(
    store: web::Data<dyn TravelStore>,
    query: web::Query<LocationQuery>,
) -> Result<impl Responder, TravelError> {
    let locations = store.list_locations(&query).await?;
    Ok(HttpResponse::Ok().json(locations))
}

/// GET /locations/{id}
/// Retrieve a location by UUID or slug
pub async fn get_location(
    store: web::Data<dyn TravelStore>,
    path: web::Path<String>,
) -> Result<impl Responder, TravelError> {
    let detail = LocationService::get_detail(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /locations
pub async fn create_location(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    body: web::Json<CreateLocationRequest>,
) -> Result<impl Responder, TravelError> {
    if let Err(e) = body.validate() {
        return Err(TravelError::from(e));
    }

    let location = LocationService::create(store.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(location))
}

/// PUT /locations/{id}
pub async fn update_location(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateLocationRequest>,
) -> Result<impl Responder, TravelError> {
    body.validate()?;

    let location = LocationService::update(store.get_ref(), path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(location))
}

/// DELETE /locations/{id}
/// Gallery images go with it; photos and stories are detached
pub async fn delete_location(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    let id = path.into_inner();
    store.delete_location(id).await?;
    log::info!("Location deleted: {}", id);
    Ok(HttpResponse::NoContent().finish())
}

/// POST /locations/{id}/images
pub async fn add_location_image(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
    body: web::Json<CreateLocationImageRequest>,
) -> Result<impl Responder, TravelError> {
    body.validate()?;

    let image = store.add_location_image(path.into_inner(), &body).await?;
    Ok(HttpResponse::Created().json(image))
}

/// DELETE /locations/{id}/images/{image_id}
pub async fn delete_location_image(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, TravelError> {
    let (location_id, image_id) = path.into_inner();
    store.delete_location_image(location_id, image_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for location routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/locations")
            .route("", web::get().to(list_locations))
            .route("", web::post().to(create_location))
            .route("/{id}", web::get().to(get_location))
            .route("/{id}", web::put().to(update_location))
            .route("/{id}", web::delete().to(delete_location))
            .route("/{id}/images", web::post().to(add_location_image))
            .route(
                "/{id}/images/{image_id}",
                web::delete().to(delete_location_image),
            ),
    );
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{admin, init_app, test_state};
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    fn lisbon() -> Value {
        json!({
            "slug": "lissabon",
            "name": "Lissabon",
            "country": "Portugal",
            "latitude": 38.7223,
            "longitude": -9.1393
        })
    }

    #[actix_web::test]
    async fn test_malformed_admin_request_without_token() {
        let app = init_app!(test_state().await);

        let req = test::TestRequest::put()
            .uri("/locations/not-a-uuid")
            .set_json(json!({ "name": 42 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/locations")
            .set_json(json!({ "slug": "ohne-name" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_create_requires_admin() {
        let app = init_app!(test_state().await);

        let req = test::TestRequest::post()
            .uri("/locations")
            .set_json(lisbon())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/locations")
            .insert_header(("X-Admin-Token", "nope"))
            .set_json(lisbon())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_create_and_fetch_by_slug() {
        let app = init_app!(test_state().await);

        let req = admin(test::TestRequest::post().uri("/locations"))
            .set_json(lisbon())
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap().to_string();

        let req = admin(test::TestRequest::post().uri(&format!("/locations/{}/images", id)))
            .set_json(json!({ "url": "https://example.com/tram.jpg", "caption": "Tram 28" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/locations/lissabon").to_request();
        let detail: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail["id"], id.as_str());
        assert_eq!(detail["name"], "Lissabon");
        assert_eq!(detail["images"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/locations?country=portugal")
            .to_request();
        let list: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_duplicate_slug_conflicts() {
        let app = init_app!(test_state().await);

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = admin(test::TestRequest::post().uri("/locations"))
                .set_json(lisbon())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }

    #[actix_web::test]
    async fn test_invalid_slug_rejected() {
        let app = init_app!(test_state().await);

        let mut body = lisbon();
        body["slug"] = json!("Lissabon Altstadt");
        let req = admin(test::TestRequest::post().uri("/locations"))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_unknown_location_is_404() {
        let app = init_app!(test_state().await);

        let req = test::TestRequest::get().uri("/locations/atlantis").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = admin(test::TestRequest::delete().uri(&format!(
            "/locations/{}",
            uuid::Uuid::new_v4()
        )))
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_empty_update_rejected() {
        let app = init_app!(test_state().await);

        let req = admin(test::TestRequest::post().uri("/locations"))
            .set_json(lisbon())
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        let req = admin(test::TestRequest::put().uri(&format!(
            "/locations/{}",
            created["id"].as_str().unwrap()
        )))
        .set_json(json!({}))
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
