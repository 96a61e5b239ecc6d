//! Directory models.

pub mod provider;
pub mod quote;
pub mod review;

pub use provider::{PlanTier, ProviderRecord};
pub use quote::{CreateQuote, QuoteRequest};
pub use review::{CreateReview, RatingSummary, Review};
