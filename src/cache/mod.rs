// src/cache/mod.rs
//
// Ephemeral TTL memoization for the expensive external calls. Owned by main
// and passed down; there is no process-global store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::edgar::models::{CompanySubmission, TickerMap};

/// Per-store TTLs. Filing lists move fastest; AI paragraphs are stable for
/// as long as the underlying document is.
pub const SUBMISSIONS_TTL: Duration = Duration::from_secs(900);
pub const TICKER_MAP_TTL: Duration = Duration::from_secs(3600);
pub const DOCUMENT_TTL: Duration = Duration::from_secs(3600);
pub const AI_SUMMARY_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key -> (value, expiry) store. Lookups evict expired entries on read;
/// only successful producer results should ever be inserted, so transient
/// failures are retried on the next lookup instead of sticking for a TTL
/// window.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> TtlCache<V> {
        TtlCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.lock().insert(key.into(), entry);
    }

    /// Drops every entry, forcing recomputation on next lookup.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        TtlCache::new()
    }
}

/// The four memo stores used by a render pass.
pub struct Caches {
    pub submissions: TtlCache<CompanySubmission>,
    pub ticker_map: TtlCache<TickerMap>,
    pub documents: TtlCache<String>,
    pub ai_summaries: TtlCache<String>,
}

impl Caches {
    pub fn new() -> Caches {
        Caches {
            submissions: TtlCache::new(),
            ticker_map: TtlCache::new(),
            documents: TtlCache::new(),
            ai_summaries: TtlCache::new(),
        }
    }

    /// Manual reset - used when rotating credentials or when the operator
    /// wants fresh summaries.
    pub fn clear_all(&self) {
        self.submissions.clear();
        self.ticker_map.clear();
        self.documents.clear();
        self.ai_summaries.clear();
        tracing::info!("All caches cleared");
    }
}

impl Default for Caches {
    fn default() -> Self {
        Caches::new()
    }
}
