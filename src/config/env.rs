// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. When absent the in-memory store is used.
    pub database_url: Option<String>,

    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8003)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Admin authentication token (CMS endpoints)
    pub admin_token: String,

    /// Shared secret the GPS tracker sends in X-Trip-Token
    pub trip_ping_token: Option<String>,

    /// Directory uploaded media is written to
    pub media_dir: PathBuf,

    /// URL prefix under which media files are reachable
    pub public_media_url: String,

    /// Upper bound for a single uploaded file
    pub max_upload_bytes: usize,

    /// Pings accepted per client IP and window
    pub ping_rate_limit: u32,

    /// Length of the rate limit window in seconds
    pub ping_rate_window_secs: u64,

    /// Use X-Forwarded-For for the client IP (only behind a trusted proxy)
    pub trust_forwarded_for: bool,

    /// Maximum connections in database pool
    pub db_max_connections: u32,

    /// Connection timeout in seconds
    pub db_connection_timeout: u64,
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        Config {
            database_url: non_empty("DATABASE_URL"),

            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),

            server_port: parse_or("SERVER_PORT", 8003),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "admin-token-dev".to_string()),

            trip_ping_token: non_empty("TRIP_PING_TOKEN"),

            media_dir: PathBuf::from(env::var("MEDIA_DIR").unwrap_or_else(|_| "./media".to_string())),

            public_media_url: env::var("PUBLIC_MEDIA_URL")
                .unwrap_or_else(|_| "/media".to_string())
                .trim_end_matches('/')
                .to_string(),

            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 50 * 1024 * 1024),

            ping_rate_limit: parse_or("PING_RATE_LIMIT", 30),

            ping_rate_window_secs: parse_or("PING_RATE_WINDOW_SECS", 60),

            trust_forwarded_for: parse_or("TRUST_FORWARDED_FOR", false),

            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 20),

            db_connection_timeout: parse_or("DB_CONNECTION_TIMEOUT", 30),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.ping_rate_limit == 0 || self.ping_rate_window_secs == 0 {
            return Err("PING_RATE_LIMIT and PING_RATE_WINDOW_SECS must be positive".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("MAX_UPLOAD_BYTES must be positive".to_string());
        }

        if self.database_url.is_none() {
            log::warn!("DATABASE_URL not configured - using in-memory store, data is not persisted");
        }

        if self.environment == "production" && self.admin_token == "admin-token-dev" {
            log::warn!("ADMIN_TOKEN is still the development default in production");
        }

        Ok(())
    }

    /// Configuration used by handler tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            server_address: "127.0.0.1".to_string(),
            server_port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            admin_token: "test-admin".to_string(),
            trip_ping_token: None,
            media_dir: std::env::temp_dir().join(format!("travelblogr-test-{}", uuid::Uuid::new_v4())),
            public_media_url: "/media".to_string(),
            max_upload_bytes: 1024,
            ping_rate_limit: 3,
            ping_rate_window_secs: 60,
            trust_forwarded_for: false,
            db_max_connections: 1,
            db_connection_timeout: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_rate_limit() {
        let mut config = Config::for_tests();
        config.ping_rate_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::for_tests().validate().is_ok());
    }
}
