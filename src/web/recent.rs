//! Recency suppressor: replay the last response served per key.
//!
//! Absorbs rapid back-to-back duplicates (React double-renders, retry storms)
//! within a few hundred milliseconds. A hit short-circuits everything,
//! including the main cache and the singleflight path, and replays the stored
//! body byte-for-byte. Both success and fallback responses are recorded.

use axum::http::StatusCode;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Prune threshold: once the map grows past this, stale entries are dropped
/// on the next insert. Entries live for hundreds of milliseconds, so the map
/// stays small in practice.
const PRUNE_AT: usize = 256;

/// A fully serialized response, ready to replay.
#[derive(Debug)]
pub struct StoredResponse {
    pub status: StatusCode,
    pub cache_control: &'static str,
    pub body: Vec<u8>,
    served_at: Instant,
}

#[derive(Clone)]
pub struct RecentResponseCache {
    entries: Arc<DashMap<String, Arc<StoredResponse>>>,
    window: Duration,
}

impl RecentResponseCache {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            window,
        }
    }

    /// Return the last response for this key if it is inside the window.
    pub fn get(&self, key: &str) -> Option<Arc<StoredResponse>> {
        let entry = self.entries.get(key)?;
        if entry.served_at.elapsed() < self.window {
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Record the response just served for this key.
    pub fn insert(&self, key: String, status: StatusCode, cache_control: &'static str, body: Vec<u8>) {
        if self.entries.len() > PRUNE_AT {
            let window = self.window;
            self.entries
                .retain(|_, stored| stored.served_at.elapsed() < window);
        }
        self.entries.insert(
            key,
            Arc::new(StoredResponse {
                status,
                cache_control,
                body,
                served_at: Instant::now(),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_inside_window_is_byte_identical() {
        let cache = RecentResponseCache::new(Duration::from_millis(400));
        cache.insert(
            "k".into(),
            StatusCode::OK,
            "public, max-age=180",
            b"{\"success\":true}".to_vec(),
        );
        let stored = cache.get("k").expect("should hit inside window");
        assert_eq!(stored.body, b"{\"success\":true}");
        assert_eq!(stored.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn miss_after_window_elapses() {
        let cache = RecentResponseCache::new(Duration::from_millis(20));
        cache.insert("k".into(), StatusCode::OK, "no-cache, no-store", vec![]);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn distinct_keys_do_not_collide() {
        let cache = RecentResponseCache::new(Duration::from_millis(400));
        cache.insert("a".into(), StatusCode::OK, "public, max-age=180", b"a".to_vec());
        assert!(cache.get("b").is_none());
    }
}
