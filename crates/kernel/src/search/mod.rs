//! Provider search and ranking.
//!
//! Filtering and ordering run over a caller-supplied slice of records and
//! keep no state between calls. The ordering is total: two distinct
//! records never compare equal, so paging over the same inputs is stable.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ProviderRecord;

/// Structured search filters.
///
/// Every field is optional and an absent field places no constraint on
/// the results. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Only providers carrying this trade tag.
    #[serde(default)]
    pub trade: Option<String>,

    /// Only providers covering this service area.
    #[serde(default)]
    pub area: Option<String>,

    /// When `Some(true)`, only providers available now. `Some(false)` is
    /// treated like `None`.
    #[serde(default)]
    pub available_now: Option<bool>,

    /// Case-insensitive substring matched against name and description.
    #[serde(default)]
    pub query: Option<String>,
}

impl SearchFilters {
    fn trade(&self) -> Option<&str> {
        non_blank(self.trade.as_deref())
    }

    fn area(&self) -> Option<&str> {
        non_blank(self.area.as_deref())
    }

    fn query(&self) -> Option<&str> {
        non_blank(self.query.as_deref())
    }

    /// Whether no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.trade().is_none()
            && self.area().is_none()
            && self.query().is_none()
            && self.available_now != Some(true)
    }

    /// Whether `record` satisfies every constraint.
    pub fn matches(&self, record: &ProviderRecord) -> bool {
        let needle = self.query().map(str::to_lowercase);
        self.matches_with(record, needle.as_deref())
    }

    fn matches_with(&self, record: &ProviderRecord, needle: Option<&str>) -> bool {
        self.trade().is_none_or(|t| record.has_trade(t))
            && self.area().is_none_or(|a| record.has_area(a))
            && (self.available_now != Some(true) || record.available_now)
            && needle.is_none_or(|n| record.matches_text(n))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Ranking order: featured, plan tier, rating, review count (all
/// descending), then creation time ascending, then id.
pub fn compare_rank(a: &ProviderRecord, b: &ProviderRecord) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then_with(|| b.plan.cmp(&a.plan))
        .then_with(|| b.average_rating.total_cmp(&a.average_rating))
        .then_with(|| b.review_count.cmp(&a.review_count))
        .then_with(|| a.created.cmp(&b.created))
        .then_with(|| a.id.cmp(&b.id))
}

/// Filter `records` and return the matches in rank order.
pub fn search(records: &[ProviderRecord], filters: &SearchFilters) -> Vec<ProviderRecord> {
    let needle = filters.query().map(str::to_lowercase);

    let mut matched: Vec<ProviderRecord> = records
        .iter()
        .filter(|r| filters.matches_with(r, needle.as_deref()))
        .cloned()
        .collect();
    matched.sort_by(compare_rank);

    debug!(
        candidates = records.len(),
        matched = matched.len(),
        trade = ?filters.trade(),
        area = ?filters.area(),
        "provider search"
    );

    matched
}

/// One page of ranked results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    /// Records on this page, in rank order.
    pub results: Vec<ProviderRecord>,
    /// Total count of matches.
    pub total: usize,
    /// Current page offset.
    pub offset: usize,
    /// Page size limit.
    pub limit: usize,
}

impl SearchPage {
    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }
}

/// Slice `ranked` into a page.
pub fn paginate(ranked: Vec<ProviderRecord>, offset: usize, limit: usize) -> SearchPage {
    let total = ranked.len();
    let results = ranked.into_iter().skip(offset).take(limit).collect();
    SearchPage {
        results,
        total,
        offset,
        limit,
    }
}
