//! The restaurants-with-filters handler.
//!
//! Control flow per request: normalize query → recency suppressor → TTL
//! cache → singleflight fetch → respond. The upstream fetch issues the
//! listings and filter-options calls in parallel and merges them into one
//! bundle.
//!
//! This endpoint serves non-critical enrichment data, so it never surfaces a
//! 5xx: any failure degrades to an empty-result body with `success: false`,
//! default filter options, and HTTP 200. Browser clients render an empty
//! state instead of an error screen.

use axum::extract::{RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

use crate::state::AppState;
use crate::upstream::FilterOptions;
use crate::web::pagination::PageInfo;
use crate::web::params::ListingsParams;
use crate::web::recent::StoredResponse;
use crate::web::routes::cache;

/// The merged upstream payload: one listings page plus the filter-option
/// sets, as cached and as shared between coalesced requests.
#[derive(Debug)]
pub struct ListingsBundle {
    pub restaurants: Vec<Value>,
    /// Upstream's claimed total; `None` or non-positive means unknown.
    pub reported_total: Option<i64>,
    pub filter_options: FilterOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingsEnvelope<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    data: ListingsData<'a>,
    pagination: PageInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingsData<'a> {
    restaurants: &'a [Value],
    total: i64,
    filter_options: &'a FilterOptions,
}

/// `GET /api/restaurants-with-filters`
pub(super) async fn restaurants_with_filters(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = ListingsParams::from_query(query.as_deref().unwrap_or(""));
    let key = params.cache_key();

    // Tier 0: replay an immediately-repeated request verbatim.
    if let Some(stored) = state.recent.get(&key) {
        return replay(&stored);
    }

    // Tier 1: fresh combined result.
    if let Some(bundle) = state.listings_cache.get(&key) {
        return respond_success(&state, &key, &params, &bundle);
    }

    // Tier 2: join (or start) the flight for this key. The fetch populates
    // the caches before the flight deregisters.
    let flight = state.flights.join(&key, {
        let state = state.clone();
        let params = params.clone();
        let key = key.clone();
        move || fetch_bundle(state, params, key)
    });

    match flight.await {
        Ok(bundle) => respond_success(&state, &key, &params, &bundle),
        Err(e) => {
            warn!(error = %e, key, "listings fetch failed, serving fallback");
            respond_fallback(&state, &key, &params, &e.to_string())
        }
    }
}

/// Fetch one merged bundle: listings and filter options in parallel.
///
/// Filter-option failures never propagate — the hardcoded default set stands
/// in and the caller is none the wiser. Listings failures (other than 404,
/// which the client maps to an empty page) fail the whole flight.
async fn fetch_bundle(
    state: AppState,
    params: ListingsParams,
    key: String,
) -> Result<Arc<ListingsBundle>, crate::upstream::errors::UpstreamError> {
    let listings_fut = state
        .upstream
        .fetch_listings(params.limit, params.offset, &params.filters);
    let options_fut = filter_options_or_default(&state);

    let (page, filter_options) = tokio::join!(listings_fut, options_fut);
    let page = page?;

    let bundle = Arc::new(ListingsBundle {
        restaurants: page.restaurants,
        reported_total: page.total,
        filter_options,
    });
    state.listings_cache.insert(key, bundle.clone());
    Ok(bundle)
}

/// Resolve filter options: snapshot cache, then upstream, then defaults.
async fn filter_options_or_default(state: &AppState) -> FilterOptions {
    if let Some(cached) = state.filter_options_cache.get() {
        return (*cached).clone();
    }
    match state.upstream.fetch_filter_options().await {
        Ok(options) => {
            state.filter_options_cache.insert(options.clone());
            options
        }
        Err(e) => {
            warn!(error = %e, "filter-options fetch failed, using default set");
            FilterOptions::default()
        }
    }
}

fn respond_success(
    state: &AppState,
    key: &str,
    params: &ListingsParams,
    bundle: &ListingsBundle,
) -> Response {
    let pagination = PageInfo::compute(
        params.limit,
        params.offset,
        bundle.restaurants.len(),
        bundle.reported_total,
    );
    let total = bundle
        .reported_total
        .filter(|t| *t > 0)
        .unwrap_or(bundle.restaurants.len() as i64);

    let envelope = ListingsEnvelope {
        success: true,
        error: None,
        data: ListingsData {
            restaurants: &bundle.restaurants,
            total,
            filter_options: &bundle.filter_options,
        },
        pagination,
    };
    serve(state, key, StatusCode::OK, cache::LISTINGS, &envelope)
}

fn respond_fallback(state: &AppState, key: &str, params: &ListingsParams, reason: &str) -> Response {
    let pagination = PageInfo::compute(params.limit, params.offset, 0, Some(0));
    let defaults = FilterOptions::default();

    let envelope = ListingsEnvelope {
        success: false,
        error: Some(reason.to_owned()),
        data: ListingsData {
            restaurants: &[],
            total: 0,
            filter_options: &defaults,
        },
        pagination,
    };
    // Degraded responses must not be cached by browsers or edges.
    serve(state, key, StatusCode::OK, cache::FALLBACK, &envelope)
}

/// Serialize once, record in the recency suppressor, and respond.
fn serve(
    state: &AppState,
    key: &str,
    status: StatusCode,
    cache_control: &'static str,
    envelope: &ListingsEnvelope<'_>,
) -> Response {
    let body = match serde_json::to_vec(envelope) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "failed to serialize listings envelope");
            br#"{"success":false,"error":"serialization failure"}"#.to_vec()
        }
    };
    state
        .recent
        .insert(key.to_owned(), status, cache_control, body.clone());
    response_with(status, cache_control, body)
}

/// Replay a stored response byte-for-byte.
fn replay(stored: &StoredResponse) -> Response {
    response_with(stored.status, stored.cache_control, stored.body.clone())
}

fn response_with(status: StatusCode, cache_control: &'static str, body: Vec<u8>) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response()
}
