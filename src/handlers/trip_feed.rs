// src/handlers/trip_feed.rs
// DOCUMENTATION: HTTP handlers for the live trip feed
// PURPOSE: GPS ping ingestion, ping history, feed summary, GeoJSON track

use crate::config::Config;
use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::models::{CreatePingRequest, PingQuery};
use crate::services::{RateLimiter, TripFeedService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::net::SocketAddr;

/// Key for the ping rate limiter
/// DOCUMENTATION: The peer address, or the first X-Forwarded-For entry when
/// TRUST_FORWARDED_FOR is set
fn client_ip(req: &HttpRequest, trust_forwarded_for: bool) -> String {
    let info = req.connection_info();
    let addr = if trust_forwarded_for {
        info.realip_remote_addr()
    } else {
        info.peer_addr()
    };

    match addr {
        Some(addr) => addr
            .parse::<SocketAddr>()
            .map(|socket| socket.ip().to_string())
            .unwrap_or_else(|_| addr.to_string()),
        None => "unknown".to_string(),
    }
}

/// Check X-Trip-Token when a tracker token is configured
fn verify_trip_token(req: &HttpRequest, config: &Config) -> Result<(), TravelError> {
    let Some(expected) = config.trip_ping_token.as_deref() else {
        return Ok(());
    };

    match req.headers().get("X-Trip-Token").and_then(|h| h.to_str().ok()) {
        Some(token) if token == expected => Ok(()),
        Some(_) => {
            log::warn!("Ping with invalid trip token");
            Err(TravelError::Forbidden)
        }
        None => {
            log::warn!("Ping without trip token");
            Err(TravelError::Unauthorized)
        }
    }
}

/// POST /trip/pings
/// Record the current position of the tracker
pub async fn create_ping(
    store: web::Data<dyn TravelStore>,
    config: web::Data<Config>,
    limiter: web::Data<RateLimiter>,
    req: HttpRequest,
    body: web::Json<CreatePingRequest>,
) -> Result<impl Responder, TravelError> {
    // counted before the token check so wrong tokens are throttled too
    let ip = client_ip(&req, config.trust_forwarded_for);
    if let Err(e) = limiter.check(&ip).await {
        log::warn!("Ping rate limit exceeded for {}", ip);
        return Err(e);
    }

    verify_trip_token(&req, &config)?;

    let ping = TripFeedService::record_ping(store.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(ping))
}

/// GET /trip/pings?since=&limit=
/// Pings in time order
pub async fn list_pings(
    store: web::Data<dyn TravelStore>,
    query: web::Query<PingQuery>,
) -> Result<impl Responder, TravelError> {
    let pings = TripFeedService::list_pings(store.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(pings))
}

/// GET /trip/pings/latest
pub async fn latest_ping(store: web::Data<dyn TravelStore>) -> Result<impl Responder, TravelError> {
    let ping = store
        .latest_ping()
        .await?
        .ok_or_else(|| TravelError::NotFound("Noch keine Position".to_string()))?;
    Ok(HttpResponse::Ok().json(ping))
}

/// GET /trip/feed
pub async fn trip_feed(store: web::Data<dyn TravelStore>) -> Result<impl Responder, TravelError> {
    let feed = TripFeedService::feed(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// GET /trip/track.geojson
pub async fn trip_track(store: web::Data<dyn TravelStore>) -> Result<impl Responder, TravelError> {
    let track = TripFeedService::track(store.get_ref()).await?;
    let body = serde_json::to_string(&track).map_err(|e| {
        log::error!("Failed to serialize track: {}", e);
        TravelError::InternalError
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .body(body))
}

/// Configuration for trip feed routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/trip")
            .route("/pings", web::post().to(create_ping))
            .route("/pings", web::get().to(list_pings))
            .route("/pings/latest", web::get().to(latest_ping))
            .route("/feed", web::get().to(trip_feed))
            .route("/track.geojson", web::get().to(trip_track)),
    );
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::handlers::test_support::{init_app, test_state, test_state_with};
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};
    use std::net::SocketAddr;

    fn ping_request(body: Value, peer: &str) -> test::TestRequest {
        let addr: SocketAddr = peer.parse().unwrap();
        test::TestRequest::post()
            .uri("/trip/pings")
            .peer_addr(addr)
            .set_json(body)
    }

    #[actix_web::test]
    async fn test_ping_validation() {
        let app = init_app!(test_state().await);

        let req = ping_request(json!({ "latitude": 91.0, "longitude": 10.0 }), "10.0.0.1:4000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = ping_request(json!({ "latitude": "nord", "longitude": 10.0 }), "10.0.0.1:4000")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = ping_request(
            json!({ "latitude": 47.37, "longitude": 8.54, "battery": 80 }),
            "10.0.0.1:4000",
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_rate_limit_per_ip() {
        let app = init_app!(test_state().await);
        let body = json!({ "latitude": 47.37, "longitude": 8.54 });

        for _ in 0..3 {
            let req = ping_request(body.clone(), "10.0.0.7:5000").to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = ping_request(body.clone(), "10.0.0.7:5001").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let error: Value = test::read_body_json(resp).await;
        assert_eq!(error["error"]["code"], "RATE_LIMIT_EXCEEDED");

        let req = ping_request(body, "10.0.0.8:5000").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_trip_token_required_when_configured() {
        let mut config = Config::for_tests();
        config.trip_ping_token = Some("tracker-secret".to_string());
        let app = init_app!(test_state_with(config).await);
        let body = json!({ "latitude": 1.0, "longitude": 2.0 });

        let req = ping_request(body.clone(), "10.0.0.1:1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = ping_request(body.clone(), "10.0.0.1:1")
            .insert_header(("X-Trip-Token", "wrong"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = ping_request(body, "10.0.0.1:1")
            .insert_header(("X-Trip-Token", "tracker-secret"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_wrong_tokens_are_rate_limited() {
        let mut config = Config::for_tests();
        config.trip_ping_token = Some("tracker-secret".to_string());
        let app = init_app!(test_state_with(config).await);
        let body = json!({ "latitude": 1.0, "longitude": 2.0 });

        let mut statuses = Vec::new();
        for attempt in 0..5 {
            let req = ping_request(body.clone(), "10.9.9.9:2000")
                .insert_header(("X-Trip-Token", format!("guess-{}", attempt)))
                .to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }

        assert_eq!(&statuses[..3], &[StatusCode::FORBIDDEN; 3]);
        assert_eq!(&statuses[3..], &[StatusCode::TOO_MANY_REQUESTS; 2]);

        // the correct token does not bypass an exhausted window
        let req = ping_request(body, "10.9.9.9:2000")
            .insert_header(("X-Trip-Token", "tracker-secret"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn test_feed_and_track() {
        let app = init_app!(test_state().await);

        let req = test::TestRequest::get().uri("/trip/pings/latest").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        for (i, (lat, lon)) in [(0.0, 0.0), (0.0, 1.0)].into_iter().enumerate() {
            let req = ping_request(
                json!({
                    "latitude": lat,
                    "longitude": lon,
                    "recorded_at": format!("2024-03-01T10:0{}:00Z", i)
                }),
                "10.0.0.2:1",
            )
            .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/trip/feed").to_request();
        let feed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(feed["ping_count"], 2);
        assert_eq!(feed["latest_ping"]["longitude"], 1.0);
        let distance = feed["total_distance_km"].as_f64().unwrap();
        assert!((distance - 111.2).abs() < 0.5, "distance was {}", distance);

        let req = test::TestRequest::get().uri("/trip/pings?limit=1").to_request();
        let pings: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(pings.as_array().unwrap().len(), 1);
        assert_eq!(pings[0]["longitude"], 1.0);

        let req = test::TestRequest::get().uri("/trip/track.geojson").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/geo+json"
        );
        let track: Value = test::read_body_json(resp).await;
        assert_eq!(track["type"], "FeatureCollection");
        assert_eq!(track["features"][0]["geometry"]["type"], "LineString");
    }
}
