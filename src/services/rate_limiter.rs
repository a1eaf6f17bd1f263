// src/services/rate_limiter.rs
// DOCUMENTATION: Fixed-window rate limiter keyed by client IP
// PURPOSE: Protect the GPS ping endpoint from floods

use crate::errors::TravelError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Requests counted in the current window of one client
#[derive(Clone, Debug)]
struct Window {
    started_at: Instant,
    count: u32,
}

impl Window {
    fn new() -> Self {
        Self {
            started_at: Instant::now(),
            count: 0,
        }
    }

    fn is_expired(&self, length: Duration) -> bool {
        self.started_at.elapsed() >= length
    }
}

/// In-memory fixed-window counter
/// DOCUMENTATION: A client may make `limit` requests per window; the window
/// starts with its first request and resets once it has elapsed
pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<String, Window>>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window_seconds: u64) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            limit,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Count one request for `key`
    pub async fn check(&self, key: &str) -> Result<(), TravelError> {
        let mut windows = self.windows.write().await;
        let entry = windows.entry(key.to_string()).or_insert_with(Window::new);

        if entry.is_expired(self.window) {
            *entry = Window::new();
        }

        if entry.count >= self.limit {
            log::debug!("Rate limit hit for {} ({} requests)", key, entry.count);
            return Err(TravelError::RateLimitExceeded);
        }

        entry.count += 1;
        Ok(())
    }

    /// Drop windows that have elapsed
    pub async fn cleanup(&self) {
        let mut windows = self.windows.write().await;
        let before_count = windows.len();
        let length = self.window;
        windows.retain(|_, w| !w.is_expired(length));
        let after_count = windows.len();

        if before_count > after_count {
            log::debug!(
                "Rate limiter cleanup: removed {} windows ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    pub async fn stats(&self) -> RateLimiterStats {
        let windows = self.windows.read().await;
        let total = windows.len();
        let expired = windows.values().filter(|w| w.is_expired(self.window)).count();

        RateLimiterStats {
            tracked_clients: total,
            expired_windows: expired,
            limit: self.limit,
            window_seconds: self.window.as_secs(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateLimiterStats {
    pub tracked_clients: usize,
    pub expired_windows: usize,
    pub limit: u32,
    pub window_seconds: u64,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes elapsed windows
pub fn start_cleanup_task(limiter: Arc<RateLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));

        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });
}
