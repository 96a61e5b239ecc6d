//! Review model for provider ratings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// Review record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Reviewed provider.
    pub provider_id: Uuid,

    /// Display name of the reviewer.
    pub author_name: String,

    /// Star rating, 1 to 5.
    pub rating: u8,

    #[serde(default)]
    pub comment: Option<String>,

    /// Unix timestamp when created.
    pub created: i64,

    /// Soft-delete flag. Deleted reviews do not count towards the rating.
    #[serde(default)]
    pub deleted: bool,
}

/// Input for creating a review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub author_name: String,
    pub rating: u8,
    pub comment: Option<String>,
}

/// Aggregate rating for one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub review_count: u32,
}

impl RatingSummary {
    /// Compute the summary of a set of ratings.
    ///
    /// The mean is clamped to `0.0..=5.0`.
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u64, 0u32), |(sum, count), r| (sum + u64::from(r), count + 1));

        if count == 0 {
            return Self::default();
        }

        let mean = sum as f64 / f64::from(count);
        Self {
            average_rating: mean.clamp(0.0, f64::from(MAX_RATING)),
            review_count: count,
        }
    }
}
