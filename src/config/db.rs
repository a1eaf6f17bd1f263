// src/config/db.rs
// DOCUMENTATION: Database connection pool initialization
// PURPOSE: Setup the PostgreSQL pool and pick the store backend

use crate::config::Config;
use crate::db::{MemoryStore, PgStore, TravelStore};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

/// Initialize PostgreSQL connection pool
/// DOCUMENTATION: Creates the pool and applies pending migrations
pub async fn init_db_pool(config: &Config, database_url: &str) -> Result<PgPool, sqlx::Error> {
    log::info!("Initializing database pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        // Connection idle timeout (5 minutes)
        .idle_timeout(Duration::from_secs(300))
        // Connection lifetime (30 minutes before recycle)
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    log::info!("Database pool initialized and migrations applied");
    Ok(pool)
}

/// Build the store selected by configuration
/// DOCUMENTATION: Postgres when DATABASE_URL is set, in-memory otherwise
pub async fn init_store(config: &Config) -> Result<Arc<dyn TravelStore>, sqlx::Error> {
    match &config.database_url {
        Some(url) => {
            let pool = init_db_pool(config, url).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            log::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
