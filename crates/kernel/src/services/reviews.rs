//! Review ledger.
//!
//! Holds every review per provider and derives the rating summary from
//! the non-deleted ones.

use dashmap::DashMap;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::review::{MAX_RATING, MIN_RATING};
use crate::models::{CreateReview, RatingSummary, Review};

/// Longest accepted review comment, in characters.
const MAX_COMMENT_CHARS: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("invalid review: {0}")]
    InvalidReview(String),

    #[error("review not found")]
    NotFound,

    #[error("unknown provider")]
    UnknownProvider,
}

/// Reviews grouped by provider, with a reverse index by review id.
#[derive(Default)]
pub struct ReviewLedger {
    by_provider: DashMap<Uuid, Vec<Review>>,
    provider_of: DashMap<Uuid, Uuid>,
}

impl ReviewLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an existing review (used when loading a catalog). Reviews
    /// with a rating outside the accepted range are skipped. Returns
    /// whether the review was kept.
    pub fn seed(&self, review: Review) -> bool {
        if !(MIN_RATING..=MAX_RATING).contains(&review.rating) {
            warn!(
                review_id = %review.id,
                provider_id = %review.provider_id,
                rating = review.rating,
                "dropping review with out-of-range rating"
            );
            return false;
        }
        self.provider_of.insert(review.id, review.provider_id);
        self.by_provider
            .entry(review.provider_id)
            .or_default()
            .push(review);
        true
    }

    /// Validate and record a new review. Returns the stored review and the
    /// provider's updated summary.
    pub fn add(
        &self,
        provider_id: Uuid,
        input: CreateReview,
        now: i64,
    ) -> Result<(Review, RatingSummary), ReviewError> {
        let author_name = input.author_name.trim().to_string();
        if author_name.is_empty() {
            return Err(ReviewError::InvalidReview(
                "author name is required".to_string(),
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            return Err(ReviewError::InvalidReview(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        let comment = input
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if comment
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
        {
            return Err(ReviewError::InvalidReview(format!(
                "comment exceeds {MAX_COMMENT_CHARS} characters"
            )));
        }

        let review = Review {
            id: Uuid::now_v7(),
            provider_id,
            author_name,
            rating: input.rating,
            comment,
            created: now,
            deleted: false,
        };

        let mut reviews = self.by_provider.entry(provider_id).or_default();
        reviews.push(review.clone());
        let summary = summarize(&reviews);
        drop(reviews);

        self.provider_of.insert(review.id, provider_id);
        Ok((review, summary))
    }

    /// Soft-delete a review. Returns the provider id and its updated summary.
    pub fn remove(&self, review_id: Uuid) -> Result<(Uuid, RatingSummary), ReviewError> {
        let provider_id = self
            .provider_of
            .get(&review_id)
            .map(|p| *p)
            .ok_or(ReviewError::NotFound)?;

        let mut reviews = self
            .by_provider
            .get_mut(&provider_id)
            .ok_or(ReviewError::NotFound)?;
        let review = reviews
            .iter_mut()
            .find(|r| r.id == review_id && !r.deleted)
            .ok_or(ReviewError::NotFound)?;
        review.deleted = true;

        Ok((provider_id, summarize(&reviews)))
    }

    /// Current summary for a provider.
    pub fn summary(&self, provider_id: Uuid) -> RatingSummary {
        self.by_provider
            .get(&provider_id)
            .map(|reviews| summarize(&reviews))
            .unwrap_or_default()
    }

    /// Non-deleted reviews for a provider, newest first.
    pub fn list_for(&self, provider_id: Uuid) -> Vec<Review> {
        let mut reviews: Vec<Review> = self
            .by_provider
            .get(&provider_id)
            .map(|reviews| reviews.iter().filter(|r| !r.deleted).cloned().collect())
            .unwrap_or_default();
        reviews.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        reviews
    }

    /// Providers that have at least one review entry.
    pub fn provider_ids(&self) -> Vec<Uuid> {
        self.by_provider.iter().map(|e| *e.key()).collect()
    }
}

impl std::fmt::Debug for ReviewLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewLedger")
            .field("reviews", &self.provider_of.len())
            .finish()
    }
}

fn summarize(reviews: &[Review]) -> RatingSummary {
    RatingSummary::from_ratings(reviews.iter().filter(|r| !r.deleted).map(|r| r.rating))
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn input(rating: u8) -> CreateReview {
        CreateReview {
            author_name: "Sam".to_string(),
            rating,
            comment: None,
        }
    }

    #[test]
    fn test_add_recomputes_mean() {
        let ledger = ReviewLedger::new();
        let provider = Uuid::now_v7();
        ledger.add(provider, input(5), 1).unwrap();
        let (_, summary) = ledger.add(provider, input(2), 2).unwrap();
        assert!((summary.average_rating - 3.5).abs() < f64::EPSILON);
        assert_eq!(summary.review_count, 2);
    }

    #[test]
    fn test_remove_recomputes_mean() {
        let ledger = ReviewLedger::new();
        let provider = Uuid::now_v7();
        let (low, _) = ledger.add(provider, input(1), 1).unwrap();
        ledger.add(provider, input(5), 2).unwrap();

        let (owner, summary) = ledger.remove(low.id).unwrap();
        assert_eq!(owner, provider);
        assert_eq!(summary.average_rating, 5.0);
        assert_eq!(summary.review_count, 1);
        assert_eq!(ledger.remove(low.id), Err(ReviewError::NotFound));
    }

    #[test]
    fn test_removing_last_review_resets_to_zero() {
        let ledger = ReviewLedger::new();
        let provider = Uuid::now_v7();
        let (only, _) = ledger.add(provider, input(4), 1).unwrap();
        let (_, summary) = ledger.remove(only.id).unwrap();
        assert_eq!(summary, RatingSummary::default());
    }

    #[test]
    fn test_rejects_out_of_range_rating() {
        let ledger = ReviewLedger::new();
        assert!(matches!(
            ledger.add(Uuid::now_v7(), input(0), 1),
            Err(ReviewError::InvalidReview(_))
        ));
        assert!(matches!(
            ledger.add(Uuid::now_v7(), input(6), 1),
            Err(ReviewError::InvalidReview(_))
        ));
    }

    #[test]
    fn test_seed_skips_out_of_range_rating() {
        let ledger = ReviewLedger::new();
        let provider = Uuid::now_v7();
        let seeded = |rating| Review {
            id: Uuid::now_v7(),
            provider_id: provider,
            author_name: "Imported".to_string(),
            rating,
            comment: None,
            created: 0,
            deleted: false,
        };

        assert!(ledger.seed(seeded(4)));
        assert!(!ledger.seed(seeded(0)));
        assert!(!ledger.seed(seeded(9)));

        let summary = ledger.summary(provider);
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(summary.review_count, 1);
        assert_eq!(ledger.list_for(provider).len(), 1);
    }

    #[test]
    fn test_rejects_blank_author() {
        let ledger = ReviewLedger::new();
        let mut review = input(4);
        review.author_name = "  ".to_string();
        assert!(ledger.add(Uuid::now_v7(), review, 1).is_err());
    }

    #[test]
    fn test_list_excludes_deleted_newest_first() {
        let ledger = ReviewLedger::new();
        let provider = Uuid::now_v7();
        let (old, _) = ledger.add(provider, input(3), 10).unwrap();
        let (gone, _) = ledger.add(provider, input(1), 20).unwrap();
        let (new, _) = ledger.add(provider, input(5), 30).unwrap();
        ledger.remove(gone.id).unwrap();

        let ids: Vec<_> = ledger.list_for(provider).iter().map(|r| r.id).collect();
        assert_eq!(ids, [new.id, old.id]);
    }
}
