//! In-memory response cache with time-based expiry.
//!
//! Eviction is pull-based: an expired entry is deleted on the lookup that
//! finds it stale, never by a background timer. The cache lives in memory
//! only and does not survive restarts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::{ForecastSeries, HistoricalSeries, WeatherSnapshot};

/// A normalized response stored under a composite key.
#[derive(Debug, Clone)]
pub enum CachedResponse {
    Current(WeatherSnapshot),
    Forecast(ForecastSeries),
    Historical(HistoricalSeries),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: CachedResponse,
    stored_at: Instant,
}

/// Timed cache keyed by operation + parameters (e.g. `current_Warsaw`).
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    /// Key for a current-conditions lookup.
    pub fn current_key(city: &str) -> String {
        format!("current_{}", city)
    }

    /// Key for a forecast lookup.
    pub fn forecast_key(city: &str) -> String {
        format!("forecast_{}", city)
    }

    /// Key for a historical lookup; both dates participate so different
    /// ranges for the same city never collide.
    pub fn historical_key(city: &str, start: &str, end: &str) -> String {
        format!("historical_{}_{}_{}", city, start, end)
    }

    /// Look up a fresh entry, deleting it if it has expired.
    pub fn get(&mut self, key: &str) -> Option<&CachedResponse> {
        self.get_at(key, Instant::now())
    }

    /// Store a response under `key` with the current time.
    pub fn insert(&mut self, key: String, data: CachedResponse) {
        self.insert_at(key, data, Instant::now());
    }

    // Time-injected variants keep the expiry boundary testable without
    // sleeping in tests.

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<&CachedResponse> {
        let expired = match self.entries.get(key) {
            Some(entry) => now.duration_since(entry.stored_at) >= self.ttl,
            None => return None,
        };

        if expired {
            self.entries.remove(key);
            tracing::debug!("Evicted stale cache entry: {}", key);
            return None;
        }

        self.entries.get(key).map(|entry| &entry.data)
    }

    pub(crate) fn insert_at(&mut self, key: String, data: CachedResponse, now: Instant) {
        self.entries.insert(key, CacheEntry { data, stored_at: now });
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries (expired-but-unvisited entries count too).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
