//! TTL cache for successful GET responses.

use crate::response::Payload;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Thread-safe response cache keyed by `METHOD:endpoint`.
///
/// Expired entries are evicted lazily on read. A zero TTL disables the
/// cache entirely.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

#[derive(Debug)]
struct CacheEntry {
    value: Payload,
    expires_at: Instant,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &str) -> Option<Payload> {
        if let Some(entry) = self.entries.get(key) {
            if Instant::now() <= entry.expires_at {
                return Some(entry.value.clone());
            }
            drop(entry);
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: &str, value: Payload) {
        if !self.is_enabled() {
            return;
        }
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.insert(key.to_string(), entry);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Entry count, expired-but-unread entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache key for a call: `METHOD:endpoint`.
pub fn cache_key(method: &str, endpoint: &str) -> String {
    format!("{}:{}", method, endpoint)
}
