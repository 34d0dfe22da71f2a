//! Longer-lived snapshot cache for the filter-options sub-payload.
//!
//! The upstream filter-options call takes no parameters, so this is a single
//! slot rather than a keyed map. Filter option sets change far less often
//! than listings, hence the roughly 2x TTL relative to the listings cache.

use crate::upstream::FilterOptions;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct FilterOptionsCache {
    slot: Arc<RwLock<Option<(Instant, Arc<FilterOptions>)>>>,
    ttl: Duration,
}

impl FilterOptionsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Return the snapshot if it is fresh.
    pub fn get(&self) -> Option<Arc<FilterOptions>> {
        let guard = self.slot.read().ok()?;
        let (cached_at, ref value) = *guard.as_ref()?;
        if cached_at.elapsed() < self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    /// Replace the snapshot. Called only with real upstream data; fallback
    /// defaults are never stored.
    pub fn insert(&self, options: FilterOptions) {
        if let Ok(mut guard) = self.slot.write() {
            *guard = Some((Instant::now(), Arc::new(options)));
        }
    }
}
