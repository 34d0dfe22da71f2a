//! Environment-driven configuration.
//!
//! Extracted from the process environment via figment (`Env::raw()` in
//! `main.rs`), so every field can be set as an environment variable, e.g.
//! `UPSTREAM_BASE_URL` or `LISTINGS_CACHE_TTL_SECS`. Every field has a
//! default suitable for local development.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the listings backend (no trailing slash).
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// Timeout for a single upstream HTTP call.
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// TTL for combined listings+filter-options cache entries.
    #[serde(default = "default_listings_cache_ttl_secs")]
    pub listings_cache_ttl_secs: u64,

    /// TTL for the filter-options snapshot. Filter option sets change far
    /// less often than listings, so this defaults to 2x the listings TTL.
    #[serde(default = "default_filter_options_ttl_secs")]
    pub filter_options_ttl_secs: u64,

    /// Window in which an immediately-repeated request replays the last
    /// response verbatim instead of recomputing it.
    #[serde(default = "default_recency_window_ms")]
    pub recency_window_ms: u64,

    /// Upper bound on cached listings entries. At capacity, expired entries
    /// are pruned and then the oldest entry is evicted.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Base log level when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn listings_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.listings_cache_ttl_secs)
    }

    pub fn filter_options_ttl(&self) -> Duration {
        Duration::from_secs(self.filter_options_ttl_secs)
    }

    pub fn recency_window(&self) -> Duration {
        Duration::from_millis(self.recency_window_ms)
    }
}

fn default_port() -> u16 {
    8080
}

fn default_upstream_base_url() -> String {
    "http://localhost:8082".to_owned()
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

fn default_listings_cache_ttl_secs() -> u64 {
    180
}

fn default_filter_options_ttl_secs() -> u64 {
    360
}

fn default_recency_window_ms() -> u64 {
    400
}

fn default_cache_max_entries() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_owned()
}
