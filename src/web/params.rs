//! Query normalization for the listings endpoint.
//!
//! The raw query string is never rejected: malformed `limit`/`offset` values
//! fall back to defaults, and everything else passes through to the upstream
//! listings call untouched. Normalized parameters also produce the cache key,
//! so requests that differ only in parameter order (or in out-of-range
//! limit/offset values that clamp to the same thing) share one cache entry.

pub const DEFAULT_LIMIT: u32 = 24;
pub const MAX_LIMIT: u32 = 100;

/// Normalized request parameters for the listings endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingsParams {
    /// Page size, clamped to `[1, MAX_LIMIT]`.
    pub limit: u32,
    /// Row offset, floored at 0.
    pub offset: u32,
    /// Pass-through filter pairs, sorted by (key, value).
    pub filters: Vec<(String, String)>,
}

impl ListingsParams {
    /// Parse a raw query string (without the leading `?`).
    pub fn from_query(query: &str) -> Self {
        let mut limit = DEFAULT_LIMIT;
        let mut offset = 0u32;
        let mut filters: Vec<(String, String)> = Vec::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "limit" => limit = parse_clamped(&value, DEFAULT_LIMIT, 1, MAX_LIMIT),
                "offset" => offset = parse_clamped(&value, 0, 0, u32::MAX),
                _ => filters.push((key.into_owned(), value.into_owned())),
            }
        }

        filters.sort();
        Self {
            limit,
            offset,
            filters,
        }
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.offset / self.limit + 1
    }

    /// Cache key: the sorted filter pairs re-encoded as a query string, with
    /// the clamped limit/offset appended.
    ///
    /// Pairs are percent-encoded, not string-joined: a decoded value that
    /// happens to contain `&` or `=` must not collide with a query that
    /// spells the same bytes as separate parameters.
    pub fn cache_key(&self) -> String {
        let mut key = url::form_urlencoded::Serializer::new(String::new());
        // Filters first (pre-sorted), then the normalized limit/offset.
        for (name, value) in &self.filters {
            key.append_pair(name, value);
        }
        key.append_pair("limit", &self.limit.to_string())
            .append_pair("offset", &self.offset.to_string())
            .finish()
    }
}

/// Parse an integer, falling back to `default` for non-numeric input and
/// clamping the result into `[min, max]`. Negative numbers clamp to `min`.
fn parse_clamped(raw: &str, default: u32, min: u32, max: u32) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(n) if n < i64::from(min) => min,
        Ok(n) => u32::try_from(n).unwrap_or(max).clamp(min, max),
        Err(_) => default,
    }
}
