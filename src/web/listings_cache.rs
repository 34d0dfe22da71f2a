//! TTL cache for merged listings bundles, one entry per normalized query.
//!
//! Stores typed `Arc<ListingsBundle>` — no JSON round-trip on reads. Unlike
//! the original source of this data, the cache is bounded: at capacity,
//! expired entries are pruned and then the oldest survivor is evicted, so a
//! long-lived process never grows without limit.

use crate::web::listings::ListingsBundle;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
pub struct ListingsCache {
    /// cache_key → (cached_at, bundle)
    entries: Arc<DashMap<String, (Instant, Arc<ListingsBundle>)>>,
    ttl: Duration,
    max_entries: usize,
}

impl ListingsCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Return a cached bundle if it exists and is fresh.
    pub fn get(&self, key: &str) -> Option<Arc<ListingsBundle>> {
        let entry = self.entries.get(key)?;
        let (cached_at, ref value) = *entry;
        if cached_at.elapsed() < self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    /// Store a fresh bundle for the given key, evicting if at capacity.
    pub fn insert(&self, key: String, value: Arc<ListingsBundle>) {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.prune_expired();
            if self.entries.len() >= self.max_entries {
                self.evict_oldest();
            }
        }
        self.entries.insert(key, (Instant::now(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry past its TTL.
    fn prune_expired(&self) {
        let before = self.entries.len();
        self.entries
            .retain(|_, (cached_at, _)| cached_at.elapsed() < self.ttl);
        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!(pruned, "pruned expired listings cache entries");
        }
    }

    /// Evict the entry with the oldest insertion time.
    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().0)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            debug!(key, "evicted oldest listings cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle(marker: &str) -> Arc<ListingsBundle> {
        Arc::new(ListingsBundle {
            restaurants: vec![json!({ "name": marker })],
            reported_total: Some(1),
            filter_options: Default::default(),
        })
    }

    #[test]
    fn fresh_entries_hit() {
        let cache = ListingsCache::new(Duration::from_secs(60), 8);
        assert!(cache.is_empty());
        cache.insert("a".into(), bundle("x"));
        assert!(!cache.is_empty());
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[tokio::test]
    async fn stale_entries_miss() {
        let cache = ListingsCache::new(Duration::from_millis(10), 8);
        cache.insert("a".into(), bundle("x"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn capacity_is_bounded() {
        let cache = ListingsCache::new(Duration::from_secs(60), 3);
        for i in 0..10 {
            cache.insert(format!("key-{i}"), bundle("x"));
        }
        assert!(cache.len() <= 3);
    }

    #[test]
    fn eviction_drops_the_oldest() {
        let cache = ListingsCache::new(Duration::from_secs(60), 2);
        cache.insert("first".into(), bundle("1"));
        cache.insert("second".into(), bundle("2"));
        cache.insert("third".into(), bundle("3"));
        assert!(cache.get("first").is_none());
        assert!(cache.get("third").is_some());
    }

    #[test]
    fn overwriting_existing_key_does_not_evict() {
        let cache = ListingsCache::new(Duration::from_secs(60), 2);
        cache.insert("a".into(), bundle("1"));
        cache.insert("b".into(), bundle("2"));
        cache.insert("a".into(), bundle("3"));
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_some());
    }
}
