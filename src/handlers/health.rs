// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service and store status

use crate::db::TravelStore;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(store: web::Data<dyn TravelStore>) -> impl Responder {
    match store.stats().await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "service": "travelblogr-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "service": "travelblogr-api",
                "version": env!("CARGO_PKG_VERSION")
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{init_app, test_state};
    use actix_web::test;

    #[actix_web::test]
    async fn test_health_ok() {
        let app = init_app!(test_state().await);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "travelblogr-api");
    }
}
