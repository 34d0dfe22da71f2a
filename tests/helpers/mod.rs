//! Shared test fixtures: a scriptable mock of the listings backend and a
//! gateway router wired to it.
#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use jewgo_gateway::config::Config;
use jewgo_gateway::state::AppState;
use jewgo_gateway::upstream::UpstreamApi;
use jewgo_gateway::web::create_router;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// How the mock answers `GET /api/restaurants/filtered`.
#[derive(Clone)]
pub enum ListingsReply {
    /// A JSON page with `rows` synthetic restaurants and an optional total.
    Page { rows: usize, total: Option<i64> },
    /// The same, after a delay (for overlapping-request tests).
    Slow {
        delay: Duration,
        rows: usize,
        total: Option<i64>,
    },
    /// A bare status code with no body.
    Status(u16),
}

/// How the mock answers `GET /api/filter-options`.
#[derive(Clone)]
pub enum OptionsReply {
    /// A distinctive option set (not the gateway's hardcoded defaults).
    Ok,
    Status(u16),
}

#[derive(Clone)]
struct MockShared {
    listings_reply: ListingsReply,
    options_reply: OptionsReply,
    listings_calls: Arc<AtomicUsize>,
    options_calls: Arc<AtomicUsize>,
    last_listings_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

/// A live mock listings backend on an ephemeral local port.
pub struct MockUpstream {
    pub url: String,
    listings_calls: Arc<AtomicUsize>,
    options_calls: Arc<AtomicUsize>,
    last_listings_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

impl MockUpstream {
    pub async fn start(listings_reply: ListingsReply, options_reply: OptionsReply) -> Self {
        let shared = MockShared {
            listings_reply,
            options_reply,
            listings_calls: Arc::new(AtomicUsize::new(0)),
            options_calls: Arc::new(AtomicUsize::new(0)),
            last_listings_query: Arc::new(Mutex::new(None)),
        };

        let router = Router::new()
            .route("/api/restaurants/filtered", get(mock_listings))
            .route("/api/filter-options", get(mock_filter_options))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock upstream");
        let addr = listener.local_addr().expect("mock upstream has no addr");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("mock upstream crashed");
        });

        Self {
            url: format!("http://{addr}"),
            listings_calls: shared.listings_calls,
            options_calls: shared.options_calls,
            last_listings_query: shared.last_listings_query,
        }
    }

    pub fn listings_calls(&self) -> usize {
        self.listings_calls.load(Ordering::SeqCst)
    }

    pub fn options_calls(&self) -> usize {
        self.options_calls.load(Ordering::SeqCst)
    }

    /// Query parameters of the most recent listings call.
    pub fn last_listings_query(&self) -> HashMap<String, String> {
        self.last_listings_query
            .lock()
            .unwrap()
            .clone()
            .expect("no listings call was made")
    }
}

async fn mock_listings(
    State(mock): State<MockShared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    mock.listings_calls.fetch_add(1, Ordering::SeqCst);
    *mock.last_listings_query.lock().unwrap() = Some(query);

    match mock.listings_reply {
        ListingsReply::Page { rows, total } => listings_page(rows, total),
        ListingsReply::Slow { delay, rows, total } => {
            tokio::time::sleep(delay).await;
            listings_page(rows, total)
        }
        ListingsReply::Status(code) => status_only(code),
    }
}

async fn mock_filter_options(State(mock): State<MockShared>) -> Response {
    mock.options_calls.fetch_add(1, Ordering::SeqCst);

    match mock.options_reply {
        OptionsReply::Ok => Json(json!({
            "agencies": ["Mock Agency"],
            "kosherCategories": ["meat"],
            "listingTypes": ["restaurant"],
            "priceRanges": ["$"],
            "cities": ["Miami"],
            "states": ["FL"],
        }))
        .into_response(),
        OptionsReply::Status(code) => status_only(code),
    }
}

fn listings_page(rows: usize, total: Option<i64>) -> Response {
    let restaurants: Vec<Value> = (0..rows)
        .map(|i| json!({"id": i, "name": format!("Restaurant {i}")}))
        .collect();
    let mut body = json!({ "restaurants": restaurants });
    if let Some(total) = total {
        body["total"] = json!(total);
    }
    Json(body).into_response()
}

fn status_only(code: u16) -> Response {
    StatusCode::from_u16(code)
        .expect("invalid mock status code")
        .into_response()
}

/// A default-config `Config` pointed at the given upstream.
pub fn test_config(upstream_url: &str) -> Config {
    let mut config: Config = serde_json::from_str("{}").expect("defaults should deserialize");
    config.upstream_base_url = upstream_url.to_owned();
    config.upstream_timeout_secs = 5;
    config
}

/// Build the gateway router against the given config.
pub fn gateway(config: &Config) -> Router {
    let upstream = UpstreamApi::new(&config.upstream_base_url, config.upstream_timeout())
        .expect("upstream client should build");
    create_router(AppState::new(Arc::new(upstream), config))
}

/// One in-process GET against the gateway; returns status, Cache-Control, and
/// the raw body bytes.
pub async fn get_raw(router: &Router, uri: &str) -> (StatusCode, String, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("router call failed");

    let status = response.status();
    let cache_control = response
        .headers()
        .get("cache-control")
        .map(|v| v.to_str().unwrap_or_default().to_owned())
        .unwrap_or_default();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body")
        .to_vec();
    (status, cache_control, body)
}

/// Like `get_raw`, but parses the body as JSON.
pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, String, Value) {
    let (status, cache_control, body) = get_raw(router, uri).await;
    let value = serde_json::from_slice(&body).expect("body should be JSON");
    (status, cache_control, value)
}
