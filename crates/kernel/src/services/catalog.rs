//! In-memory provider catalog.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ProviderRecord, RatingSummary, Review};

/// On-disk catalog shape.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub providers: Vec<ProviderRecord>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl CatalogFile {
    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse catalog {}", path.display()))
    }
}

/// Provider records keyed by id.
///
/// Uses `parking_lot::RwLock` so a panicking writer cannot poison readers.
#[derive(Default)]
pub struct Catalog {
    providers: RwLock<HashMap<Uuid, ProviderRecord>>,
}

impl Catalog {
    pub fn new(records: impl IntoIterator<Item = ProviderRecord>) -> Self {
        let providers = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            providers: RwLock::new(providers),
        }
    }

    /// Insert or replace a record.
    pub fn upsert(&self, record: ProviderRecord) {
        self.providers.write().insert(record.id, record);
    }

    pub fn get(&self, id: Uuid) -> Option<ProviderRecord> {
        self.providers.read().get(&id).cloned()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.providers.read().contains_key(&id)
    }

    /// All records, in no particular order.
    pub fn snapshot(&self) -> Vec<ProviderRecord> {
        self.providers.read().values().cloned().collect()
    }

    /// Store a recomputed rating on the provider. Returns false if the
    /// provider is unknown.
    pub fn apply_rating(&self, id: Uuid, summary: RatingSummary) -> bool {
        let mut providers = self.providers.write();
        let Some(record) = providers.get_mut(&id) else {
            return false;
        };
        record.average_rating = summary.average_rating;
        record.review_count = summary.review_count;
        debug!(
            provider_id = %id,
            average_rating = summary.average_rating,
            review_count = summary.review_count,
            "provider rating updated"
        );
        true
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("providers", &self.len())
            .finish()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::PlanTier;

    fn record(name: &str) -> ProviderRecord {
        ProviderRecord {
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
        }
    }

    #[test]
    fn test_get_and_snapshot() {
        let a = record("A");
        let id = a.id;
        let catalog = Catalog::new([a, record("B")]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(id).unwrap().name, "A");
        assert_eq!(catalog.snapshot().len(), 2);
        assert!(catalog.get(Uuid::nil()).is_none());
    }

    #[test]
    fn test_apply_rating() {
        let a = record("A");
        let id = a.id;
        let catalog = Catalog::new([a]);
        let summary = RatingSummary {
            average_rating: 4.5,
            review_count: 2,
        };
        assert!(catalog.apply_rating(id, summary));
        assert_eq!(catalog.get(id).unwrap().review_count, 2);
        assert!(!catalog.apply_rating(Uuid::nil(), summary));
    }

    #[test]
    fn test_catalog_file_parse() {
        let json = format!(
            r#"{{"providers":[{{"id":"{}","name":"Sparks","created":1,"plan":"pro"}}]}}"#,
            Uuid::nil()
        );
        let file: CatalogFile = serde_json::from_str(&json).unwrap();
        assert_eq!(file.providers.len(), 1);
        assert_eq!(file.providers[0].plan, PlanTier::Pro);
        assert!(file.reviews.is_empty());
    }
}
