//! Search route handlers.

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{ClientId, enforce};
use crate::models::PlanTier;
use crate::rate_limit::RateLimitAction;
use crate::search::{SearchFilters, paginate};
use crate::state::AppState;
use crate::tiering::{mark_boosted, slot_limit};

/// Create the search router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(search_json))
}

/// Search query parameters.
///
/// Everything is taken as text and parsed leniently: a blank or malformed
/// value means "not set", so form submissions never get rejected.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Free-text query.
    pub q: Option<String>,
    pub trade: Option<String>,
    pub area: Option<String>,
    pub available: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<String>,
    /// Results per page.
    pub limit: Option<String>,
}

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

impl SearchQuery {
    /// Only an explicit yes (`true`, `1`, `on`) constrains availability.
    fn available_now(&self) -> Option<bool> {
        let value = self.available.as_deref()?.trim();
        ["true", "1", "on"]
            .iter()
            .any(|yes| value.eq_ignore_ascii_case(yes))
            .then_some(true)
    }

    fn page(&self) -> usize {
        parse_count(self.page.as_deref())
            .unwrap_or(DEFAULT_PAGE)
            .max(1)
    }

    fn limit(&self) -> usize {
        parse_count(self.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT)
    }
}

fn parse_count(value: Option<&str>) -> Option<usize> {
    value?.trim().parse().ok()
}

/// JSON search response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchJsonResponse {
    pub filters: SearchFilters,
    pub results: Vec<SearchResultJson>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Single search result in JSON format.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultJson {
    pub id: Uuid,
    pub name: String,
    pub trades: Vec<String>,
    pub areas: Vec<String>,
    pub average_rating: f64,
    pub review_count: u32,
    pub plan: PlanTier,
    pub featured: bool,
    pub claimed: bool,
    pub available_now: bool,
    /// Whether the listing is shown with paid prominence on this page.
    pub boosted: bool,
    /// Boosted slots this listing's tier gets per page.
    pub slot_limit: usize,
    pub url: String,
}

/// JSON search endpoint.
async fn search_json(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchJsonResponse>> {
    enforce(&state, RateLimitAction::Search, &client)?;

    let page = params.page();
    let limit = params.limit();
    let offset = (page - 1).saturating_mul(limit);

    let filters = SearchFilters {
        available_now: params.available_now(),
        trade: params.trade,
        area: params.area,
        query: params.q,
    };

    let ranked = state.directory().search(&filters);
    let page_data = paginate(ranked, offset, limit);
    let boosted = mark_boosted(&page_data.results);
    let total_pages = page_data.total_pages();
    state.metrics().record_search();

    let results = page_data
        .results
        .into_iter()
        .zip(boosted)
        .map(|(r, boosted)| SearchResultJson {
            url: format!("/api/providers/{}", r.id),
            id: r.id,
            name: r.name,
            trades: r.trades.into_iter().collect(),
            areas: r.areas.into_iter().collect(),
            average_rating: r.average_rating,
            review_count: r.review_count,
            slot_limit: slot_limit(r.plan),
            plan: r.plan,
            featured: r.featured,
            claimed: r.claimed,
            available_now: r.available_now,
            boosted,
        })
        .collect();

    Ok(Json(SearchJsonResponse {
        filters,
        results,
        total: page_data.total,
        page,
        limit,
        total_pages,
    }))
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn query(available: &str, page: &str, limit: &str) -> SearchQuery {
        SearchQuery {
            available: Some(available.to_string()),
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_params_use_defaults() {
        let q = query("", "", "");
        assert_eq!(q.available_now(), None);
        assert_eq!(q.page(), DEFAULT_PAGE);
        assert_eq!(q.limit(), DEFAULT_LIMIT);

        let q = SearchQuery::default();
        assert_eq!(q.available_now(), None);
        assert_eq!(q.page(), DEFAULT_PAGE);
        assert_eq!(q.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let q = query("maybe", "two", "-1");
        assert_eq!(q.available_now(), None);
        assert_eq!(q.page(), DEFAULT_PAGE);
        assert_eq!(q.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_numbers_are_bounded() {
        let q = query("", "0", "500");
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_LIMIT);
        assert_eq!(query("", " 3 ", "0").page(), 3);
        assert_eq!(query("", "", "0").limit(), 1);
    }

    #[test]
    fn test_available_flag_values() {
        for yes in ["true", "1", "on", "TRUE", " On "] {
            assert_eq!(query(yes, "", "").available_now(), Some(true), "{yes}");
        }
        for no in ["false", "0", "off", "yes please"] {
            assert_eq!(query(no, "", "").available_now(), None, "{no}");
        }
    }
}
