//! Process-wide TTL cache for raw option lists
//!
//! Entries are immutable snapshots keyed by locator and replaced wholesale
//! on refetch. Staleness is checked at read time only; a stale entry stays
//! in the map until it is overwritten or invalidated.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde_json::Value;

/// A cached option list with its fetch time.
#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    items: Arc<Vec<Value>>,
}

/// Cheap-to-clone handle over a locator -> entry map.
///
/// Clones share the same underlying map, so a loader and its subscriptions
/// all observe the same entries. Callers must not rely on entries being
/// evicted; only [`OptionsCache::invalidate`] and [`OptionsCache::clear`]
/// remove them.
#[derive(Debug, Clone, Default)]
pub struct OptionsCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

static SHARED: Lazy<OptionsCache> = Lazy::new(OptionsCache::new);

/// The process-wide cache used by loaders that don't inject their own.
pub fn shared() -> OptionsCache {
    SHARED.clone()
}

impl OptionsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `locator`, returning the entry's items iff the entry is
    /// younger than `ttl`. A zero TTL never matches.
    pub fn fresh(&self, locator: &str, ttl: Duration) -> Option<Arc<Vec<Value>>> {
        if ttl.is_zero() {
            return None;
        }
        let entry = self.entries.get(locator)?;
        if entry.fetched_at.elapsed() < ttl {
            Some(Arc::clone(&entry.items))
        } else {
            None
        }
    }

    /// Store `items` for `locator`, overwriting any existing entry. An
    /// empty list is a valid cacheable result; last fetch wins.
    pub fn insert(&self, locator: &str, items: Vec<Value>) -> Arc<Vec<Value>> {
        let items = Arc::new(items);
        let entry = CacheEntry {
            fetched_at: Instant::now(),
            items: Arc::clone(&items),
        };
        self.entries.insert(locator.to_string(), entry);
        items
    }

    /// Drop the entry for `locator` so the next load refetches.
    pub fn invalidate(&self, locator: &str) {
        self.entries.remove(locator);
    }

    /// Drop every entry. Intended for test isolation when using the shared
    /// cache.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
