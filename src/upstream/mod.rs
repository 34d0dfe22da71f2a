//! HTTP client for the listings backend.
//!
//! Two read endpoints are consumed: the filtered listings search and the
//! filter-options set. Both are plain GET + JSON. The client never retries;
//! callers decide how failures degrade.

pub mod errors;

use crate::utils::log_if_slow;
use anyhow::Context;
use errors::UpstreamError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Threshold past which an upstream call is logged as slow.
const SLOW_FETCH: Duration = Duration::from_secs(2);

/// One page of listings from the upstream search endpoint.
///
/// `total` is whatever the upstream reports, which is not reliable: it may be
/// absent or zero even when rows exist. Pagination treats anything that is
/// not a positive number as "unknown".
#[derive(Debug, Clone, Deserialize)]
pub struct ListingsPage {
    #[serde(default)]
    pub restaurants: Vec<Value>,
    #[serde(default)]
    pub total: Option<i64>,
}

impl ListingsPage {
    /// The page a 404 stands for: past the end of the result set.
    pub fn empty() -> Self {
        Self {
            restaurants: Vec::new(),
            total: Some(0),
        }
    }
}

/// Filter option sets for the listings search UI.
///
/// Missing fields deserialize to the hardcoded defaults, and `Default` yields
/// the full default set used when the upstream call fails outright.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(default = "default_agencies")]
    pub agencies: Vec<String>,
    #[serde(default = "default_kosher_categories")]
    pub kosher_categories: Vec<String>,
    #[serde(default = "default_listing_types")]
    pub listing_types: Vec<String>,
    #[serde(default = "default_price_ranges")]
    pub price_ranges: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            agencies: default_agencies(),
            kosher_categories: default_kosher_categories(),
            listing_types: default_listing_types(),
            price_ranges: default_price_ranges(),
            cities: Vec::new(),
            states: Vec::new(),
        }
    }
}

fn default_agencies() -> Vec<String> {
    vec!["ORB".into(), "Kosher Miami".into(), "Other".into()]
}

fn default_kosher_categories() -> Vec<String> {
    vec!["meat".into(), "dairy".into(), "pareve".into()]
}

fn default_listing_types() -> Vec<String> {
    vec!["restaurant".into(), "bakery".into(), "catering".into()]
}

fn default_price_ranges() -> Vec<String> {
    vec!["$".into(), "$$".into(), "$$$".into(), "$$$$".into()]
}

/// Client for the listings backend.
pub struct UpstreamApi {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        // Validate early so a bad URL fails at startup, not per-request.
        Url::parse(base_url).with_context(|| format!("invalid upstream base URL: {base_url}"))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build upstream HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// `GET {base}/api/restaurants/filtered`
    ///
    /// Pass-through filter pairs are forwarded verbatim alongside the clamped
    /// `limit`/`offset`. A 404 means "past the last page" and is returned as
    /// an empty page rather than an error, so client paging loops terminate.
    pub async fn fetch_listings(
        &self,
        limit: u32,
        offset: u32,
        filters: &[(String, String)],
    ) -> Result<ListingsPage, UpstreamError> {
        let url = format!("{}/api/restaurants/filtered", self.base_url);
        let start = Instant::now();

        let response = self
            .client
            .get(&url)
            .query(filters)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;
        log_if_slow(start, SLOW_FETCH, "upstream listings fetch");

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(offset, "upstream listings 404, treating as empty final page");
            return Ok(ListingsPage::empty());
        }
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let page: ListingsPage =
            response
                .json()
                .await
                .map_err(|source| UpstreamError::ParseFailed {
                    url: url.clone(),
                    source,
                })?;
        debug!(
            returned = page.restaurants.len(),
            total = ?page.total,
            "upstream listings fetched"
        );
        Ok(page)
    }

    /// `GET {base}/api/filter-options`
    pub async fn fetch_filter_options(&self) -> Result<FilterOptions, UpstreamError> {
        let url = format!("{}/api/filter-options", self.base_url);
        let start = Instant::now();

        let response = self.client.get(&url).send().await?;
        log_if_slow(start, SLOW_FETCH, "upstream filter-options fetch");

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json()
            .await
            .map_err(|source| UpstreamError::ParseFailed { url, source })
    }
}
