//! Pagination metadata and the `hasMore` heuristic.
//!
//! The upstream's total count is unreliable, so `hasMore` follows a fixed
//! decision table instead of trusting arithmetic on `total` alone. The table
//! is deliberate policy, not an approximation to improve on: it exists to
//! keep client-side infinite-scroll loops from spinning forever.

use serde::Serialize;
use tracing::warn;

/// Hard page ceiling. Past this, `hasMore` is forced false no matter what the
/// upstream returned.
pub const MAX_PAGES: u32 = 50;

/// Pagination block of the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub limit: u32,
    pub offset: u32,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl PageInfo {
    /// Compute pagination metadata for one served page.
    ///
    /// `reported_total` is the upstream's claimed total; anything that is not
    /// a positive number is treated as unknown. Decision table for `hasMore`,
    /// in priority order:
    ///
    /// 1. `page > MAX_PAGES` → false (safety cutoff, logged)
    /// 2. positive total → `offset + returned < total`, exactly
    /// 3. zero rows returned → false
    /// 4. partial page (`returned < limit`) → false
    /// 5. full first page → true (optimistic)
    /// 6. full later page, no total → false (conservative)
    pub fn compute(limit: u32, offset: u32, returned: usize, reported_total: Option<i64>) -> Self {
        let page = offset / limit + 1;
        let returned = returned as u64;
        let total = reported_total.filter(|t| *t > 0).map(|t| t as u64);

        let has_more = if page > MAX_PAGES {
            warn!(
                page,
                max_pages = MAX_PAGES,
                "page ceiling exceeded, forcing hasMore=false"
            );
            false
        } else if let Some(total) = total {
            u64::from(offset) + returned < total
        } else if returned == 0 {
            false
        } else if returned < u64::from(limit) {
            false
        } else {
            // Full page, no usable total: optimistic only on page 1.
            page == 1
        };

        // Best-effort total for display: the reported count, else what this
        // page returned.
        let effective_total = total.unwrap_or(returned);
        let total_pages = if effective_total == 0 {
            0
        } else {
            effective_total.div_ceil(u64::from(limit)) as u32
        };

        Self {
            limit,
            offset,
            page,
            total_pages,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_when_total_reported() {
        // total=57, limit=24, offset=48, returned=9: last page.
        let info = PageInfo::compute(24, 48, 9, Some(57));
        assert!(!info.has_more);
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.page, 3);

        // Middle page of the same result set.
        let info = PageInfo::compute(24, 24, 24, Some(57));
        assert!(info.has_more);
        assert_eq!(info.page, 2);
    }

    #[test]
    fn zero_rows_means_no_more() {
        let info = PageInfo::compute(24, 0, 0, None);
        assert!(!info.has_more);
        assert_eq!(info.total_pages, 0);
    }

    #[test]
    fn partial_page_means_no_more() {
        let info = PageInfo::compute(24, 0, 10, None);
        assert!(!info.has_more);
    }

    #[test]
    fn full_first_page_without_total_is_optimistic() {
        let info = PageInfo::compute(24, 0, 24, None);
        assert!(info.has_more);
    }

    #[test]
    fn full_later_page_without_total_is_conservative() {
        let info = PageInfo::compute(24, 24, 24, None);
        assert!(!info.has_more);
    }

    #[test]
    fn non_positive_total_is_treated_as_unknown() {
        // total=0 with a full first page falls through to the optimistic rule.
        let info = PageInfo::compute(24, 0, 24, Some(0));
        assert!(info.has_more);

        let info = PageInfo::compute(24, 0, 24, Some(-3));
        assert!(info.has_more);
    }

    #[test]
    fn page_ceiling_forces_no_more() {
        // page 51, full page, even with a huge reported total.
        let info = PageInfo::compute(24, 50 * 24, 24, Some(1_000_000));
        assert_eq!(info.page, 51);
        assert!(!info.has_more);
    }

    #[test]
    fn page_fifty_still_uses_the_table() {
        let info = PageInfo::compute(24, 49 * 24, 24, Some(1_000_000));
        assert_eq!(info.page, 50);
        assert!(info.has_more);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageInfo::compute(24, 0, 24, Some(57)).total_pages, 3);
        assert_eq!(PageInfo::compute(24, 0, 24, Some(48)).total_pages, 2);
        assert_eq!(PageInfo::compute(10, 0, 10, Some(101)).total_pages, 11);
    }
}
