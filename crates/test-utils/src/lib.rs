//! Tradesfinder test utilities.
//!
//! Helpers for integration testing: provider and review fixtures,
//! and assertion utilities for JSON responses.

use serde_json::Value as JsonValue;
use tradesfinder_kernel::models::{PlanTier, ProviderRecord, Review};
use uuid::Uuid;

/// Create a test provider with default values: free tier, unfeatured,
/// unrated, created at the unix epoch.
pub fn test_provider(name: &str) -> TestProvider {
    TestProvider {
        record: ProviderRecord {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: None,
            trades: Default::default(),
            areas: Default::default(),
            average_rating: 0.0,
            review_count: 0,
            plan: PlanTier::Free,
            featured: false,
            claimed: false,
            available_now: false,
            created: 0,
            phone: None,
            whatsapp: None,
            call_out_fee: None,
        },
    }
}

/// A provider builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestProvider {
    pub record: ProviderRecord,
}

impl TestProvider {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.record.id = id;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.record.description = Some(description.to_string());
        self
    }

    /// Add a trade tag.
    pub fn with_trade(mut self, trade: &str) -> Self {
        self.record.trades.insert(trade.to_string());
        self
    }

    /// Add a service area.
    pub fn with_area(mut self, area: &str) -> Self {
        self.record.areas.insert(area.to_string());
        self
    }

    pub fn with_plan(mut self, plan: PlanTier) -> Self {
        self.record.plan = plan;
        self
    }

    /// Set rating and review count directly.
    pub fn with_rating(mut self, average_rating: f64, review_count: u32) -> Self {
        self.record.average_rating = average_rating;
        self.record.review_count = review_count;
        self
    }

    /// Set as featured.
    pub fn featured(mut self) -> Self {
        self.record.featured = true;
        self
    }

    /// Set as claimed.
    pub fn claimed(mut self) -> Self {
        self.record.claimed = true;
        self
    }

    /// Set as available now.
    pub fn available(mut self) -> Self {
        self.record.available_now = true;
        self
    }

    pub fn created_at(mut self, created: i64) -> Self {
        self.record.created = created;
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.record.phone = Some(phone.to_string());
        self
    }

    /// Set the call-out fee in minor units.
    pub fn with_call_out_fee(mut self, minor: i64) -> Self {
        self.record.call_out_fee = Some(minor);
        self
    }

    pub fn build(self) -> ProviderRecord {
        self.record
    }
}

/// Create a stored review for a provider.
pub fn test_review(provider_id: Uuid, rating: u8) -> Review {
    Review {
        id: Uuid::now_v7(),
        provider_id,
        author_name: "Test Reviewer".to_string(),
        rating,
        comment: None,
        created: 0,
        deleted: false,
    }
}

/// Serialize providers and reviews in catalog file format.
pub fn catalog_json(providers: &[ProviderRecord], reviews: &[Review]) -> JsonValue {
    serde_json::json!({
        "providers": providers,
        "reviews": reviews,
    })
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON array of objects has `field` values in this order.
    pub fn field_order(results: &Value, field: &str, expected: &[&str]) {
        let actual: Vec<&str> = results
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(field).and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(actual, expected, "Unexpected {field} order in {results}");
    }
}
