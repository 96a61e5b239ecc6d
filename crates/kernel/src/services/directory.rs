//! Directory service tying the catalog to reviews and quotes.
//!
//! Review writes and the catalog rating update happen under one lock, so
//! a provider's stored rating always matches the latest review set.

use std::path::Path;

use anyhow::Result;
use parking_lot::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    CreateQuote, CreateReview, ProviderRecord, QuoteRequest, RatingSummary, Review,
};
use crate::search::{self, SearchFilters};
use crate::services::catalog::{Catalog, CatalogFile};
use crate::services::quotes::{QuoteError, QuoteInbox};
use crate::services::reviews::{ReviewError, ReviewLedger};

#[derive(Debug, Default)]
pub struct Directory {
    catalog: Catalog,
    reviews: ReviewLedger,
    quotes: QuoteInbox,
    review_writes: Mutex<()>,
}

impl Directory {
    /// Build a directory from providers and their existing reviews.
    ///
    /// Stored ratings are recomputed from the reviews; reviews for unknown
    /// providers are dropped.
    pub fn new(providers: Vec<ProviderRecord>, reviews: Vec<Review>) -> Self {
        let directory = Self {
            catalog: Catalog::new(providers),
            ..Default::default()
        };

        for provider in directory.catalog.snapshot() {
            directory
                .catalog
                .apply_rating(provider.id, Default::default());
        }

        for review in reviews {
            if !directory.catalog.contains(review.provider_id) {
                warn!(review_id = %review.id, provider_id = %review.provider_id, "dropping review for unknown provider");
                continue;
            }
            directory.reviews.seed(review);
        }

        for provider_id in directory.reviews.provider_ids() {
            let summary = directory.reviews.summary(provider_id);
            directory.catalog.apply_rating(provider_id, summary);
        }

        directory
    }

    /// Load a directory from a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = CatalogFile::load(path)?;
        info!(
            path = %path.display(),
            providers = file.providers.len(),
            reviews = file.reviews.len(),
            "catalog loaded"
        );
        Ok(Self::new(file.providers, file.reviews))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn reviews(&self) -> &ReviewLedger {
        &self.reviews
    }

    pub fn quotes(&self) -> &QuoteInbox {
        &self.quotes
    }

    /// Ranked search over the whole catalog.
    pub fn search(&self, filters: &SearchFilters) -> Vec<ProviderRecord> {
        search::search(&self.catalog.snapshot(), filters)
    }

    pub fn provider(&self, id: Uuid) -> Option<ProviderRecord> {
        self.catalog.get(id)
    }

    /// Add a review and refresh the provider's rating. Returns the review
    /// and the summary it produced.
    pub fn add_review(
        &self,
        provider_id: Uuid,
        input: CreateReview,
    ) -> Result<(Review, RatingSummary), ReviewError> {
        if !self.catalog.contains(provider_id) {
            return Err(ReviewError::UnknownProvider);
        }

        let _guard = self.review_writes.lock();
        let (review, summary) = self.reviews.add(provider_id, input, now())?;
        self.catalog.apply_rating(provider_id, summary);
        Ok((review, summary))
    }

    /// Soft-delete a review and refresh the provider's rating.
    pub fn remove_review(&self, review_id: Uuid) -> Result<Uuid, ReviewError> {
        let _guard = self.review_writes.lock();
        let (provider_id, summary) = self.reviews.remove(review_id)?;
        self.catalog.apply_rating(provider_id, summary);
        Ok(provider_id)
    }

    /// Record a quote request for a listed provider.
    pub fn submit_quote(
        &self,
        provider_id: Uuid,
        input: CreateQuote,
        country_code: &str,
    ) -> Result<QuoteRequest, QuoteError> {
        if !self.catalog.contains(provider_id) {
            return Err(QuoteError::UnknownProvider);
        }
        self.quotes.submit(provider_id, input, country_code, now())
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
