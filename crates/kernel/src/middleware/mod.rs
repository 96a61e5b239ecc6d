//! HTTP middleware components.
//!
//! Provides client identification, rate limit enforcement and metrics collection.

pub mod metrics;
pub mod rate_limit;

pub use metrics::track_metrics;
pub use rate_limit::{ClientId, enforce, get_client_id, rate_limit_response, resolve_client};
