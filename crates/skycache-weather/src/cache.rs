//! In-memory response cache keyed by resource kind and location.
//!
//! Freshness is evaluated on read; stale entries stay in the map until the next write
//! for the same key overwrites them.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::types::{ResourceKind, WeatherPayload};

/// Location name folded for case-insensitive key equality
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedLocation(String);

impl NormalizedLocation {
    pub fn new(location: &str) -> Self {
        Self(location.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ResourceKind,
    pub location: NormalizedLocation,
}

impl CacheKey {
    pub fn new(kind: ResourceKind, location: &str) -> Self {
        Self {
            kind,
            location: NormalizedLocation::new(location),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.location.as_str())
    }
}

#[derive(Debug)]
struct CacheEntry {
    stored_at: DateTime<Utc>,
    payload: WeatherPayload,
}

#[derive(Debug, Default)]
pub struct WeatherCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    max_entries: Option<usize>,
}

impl WeatherCache {
    /// Unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `max_entries` keys; inserting a new key at capacity
    /// evicts the entry with the oldest `stored_at`.
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: Some(max_entries),
        }
    }

    /// Return a copy of the payload if an entry exists and `now - stored_at < ttl`.
    pub fn get_fresh(
        &self,
        key: &CacheKey,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<WeatherPayload> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;

        if now.signed_duration_since(entry.stored_at) < ttl {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Insert or overwrite the entry for `key`.
    pub fn put(&self, key: CacheKey, now: DateTime<Utc>, payload: WeatherPayload) {
        let mut entries = self.entries.lock();

        if let Some(max) = self.max_entries {
            if !entries.contains_key(&key) && entries.len() >= max {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    tracing::debug!("Evicting {} to make room for {}", oldest, key);
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                payload,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
