//! Application state shared across handlers.
//!
//! All three stores are explicitly constructed here with owner-supplied TTLs
//! and bounds from `Config` -- nothing is a process-wide singleton, and every
//! cache has an eviction story (TTL everywhere, an entry bound on the
//! listings cache). Each horizontally scaled instance keeps its own caches;
//! that is acceptable because the cached data is non-authoritative and
//! re-derivable.

use crate::config::Config;
use crate::upstream::UpstreamApi;
use crate::web::filter_options_cache::FilterOptionsCache;
use crate::web::listings_cache::ListingsCache;
use crate::web::recent::RecentResponseCache;
use crate::web::singleflight::FlightMap;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamApi>,
    pub listings_cache: ListingsCache,
    pub filter_options_cache: FilterOptionsCache,
    pub recent: RecentResponseCache,
    pub flights: FlightMap,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(upstream: Arc<UpstreamApi>, config: &Config) -> Self {
        Self {
            upstream,
            listings_cache: ListingsCache::new(
                config.listings_cache_ttl(),
                config.cache_max_entries,
            ),
            filter_options_cache: FilterOptionsCache::new(config.filter_options_ttl()),
            recent: RecentResponseCache::new(config.recency_window()),
            flights: FlightMap::new(),
            started_at: Instant::now(),
        }
    }
}
