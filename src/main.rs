// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, store, and start HTTP server

use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;
use std::io;
use travelblogr_api::config::{self, Config};
use travelblogr_api::handlers::AppState;
use travelblogr_api::services::start_cleanup_task;

/// Interval of the rate limiter cleanup task
const RATE_LIMIT_CLEANUP_SECS: u64 = 300;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.clone()
        } else {
            "info,actix_web=info,sqlx=warn".to_string()
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting travelblogr-api...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize the store (Postgres or in-memory)
    let store = match config::init_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Shared state, media directory and rate limiter cleanup
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let state = AppState::new(config, store);

    if let Err(e) = state.media.ensure_root().await {
        log::error!("Media directory unavailable: {}", e);
        std::process::exit(1);
    }

    start_cleanup_task(state.rate_limiter.clone().into_inner(), RATE_LIMIT_CLEANUP_SECS);
    log::info!(
        "Started rate limiter cleanup task (interval: {}s)",
        RATE_LIMIT_CLEANUP_SECS
    );

    // 6. Start HTTP server
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // State and routes
            .configure(move |cfg| state.configure(cfg))
    })
    .bind(&server_addr)?
    .run()
    .await
}
