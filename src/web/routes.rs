//! Web API router construction and shared response utilities.

use axum::{Router, routing::get};
use std::time::Duration;

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::middleware::security_headers::SecurityHeadersLayer;
use crate::web::{listings, status};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

/// Cache-Control presets.
pub mod cache {
    /// Successfully served listings pages (fresh or from cache).
    pub const LISTINGS: &str = "public, max-age=180";
    /// Degraded/fallback responses -- never cache.
    pub const FALLBACK: &str = "no-cache, no-store";
}

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .route(
            "/restaurants-with-filters",
            get(listings::restaurants_with_filters),
        )
        .with_state(app_state);

    let router = Router::new().nest("/api", api_router);

    router.layer((
        // Outermost: per-request ID span + severity-proportional response logging.
        RequestIdLayer,
        // Security headers on every response.
        SecurityHeadersLayer,
        CompressionLayer::new()
            .zstd(true)
            .br(true)
            .gzip(true)
            .quality(tower_http::CompressionLevel::Fastest),
        TimeoutLayer::new(Duration::from_secs(30)),
    ))
}
