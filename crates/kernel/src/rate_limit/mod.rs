//! In-process rate limiting.
//!
//! Each request source is counted per action in a fixed window. The
//! limiter owns its [`BucketStore`], which is handed in at construction,
//! so independent limiters never share counts.
//!
//! Actions differ in what happens when no decision can be made (a
//! misconfigured policy or a full store): low-stakes actions such as
//! profile-view logging fail open, submissions fail closed.

pub mod store;

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

pub use store::{
    BucketStore, DEFAULT_MAX_KEYS, RateLimitBucket, RateLimitDecision, RateLimitError,
    RateLimitPolicy,
};

/// What to do when the limiter cannot reach a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Allow the request.
    Open,
    /// Deny the request.
    Closed,
}

/// Rate-limited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitAction {
    Search,
    ProfileView,
    Review,
    Quote,
}

impl RateLimitAction {
    pub const ALL: [RateLimitAction; 4] = [
        RateLimitAction::Search,
        RateLimitAction::ProfileView,
        RateLimitAction::Review,
        RateLimitAction::Quote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RateLimitAction::Search => "search",
            RateLimitAction::ProfileView => "profile_view",
            RateLimitAction::Review => "review",
            RateLimitAction::Quote => "quote",
        }
    }

    /// Environment variable suffix, e.g. `PROFILE_VIEW`.
    pub fn env_suffix(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for RateLimitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy plus failure mode for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPolicy {
    pub policy: RateLimitPolicy,
    pub failure_mode: FailureMode,
}

impl ActionPolicy {
    pub const fn new(max_requests: u32, window: Duration, failure_mode: FailureMode) -> Self {
        Self {
            policy: RateLimitPolicy::new(max_requests, window),
            failure_mode,
        }
    }
}

/// Rate limit configuration for every action.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Directory searches.
    pub search: ActionPolicy,
    /// Profile view logging.
    pub profile_view: ActionPolicy,
    /// Review submissions.
    pub review: ActionPolicy,
    /// Quote requests.
    pub quote: ActionPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            search: ActionPolicy::new(30, Duration::from_secs(60), FailureMode::Open), // 30 per minute
            profile_view: ActionPolicy::new(120, Duration::from_secs(60), FailureMode::Open), // 120 per minute
            review: ActionPolicy::new(5, Duration::from_secs(3600), FailureMode::Closed), // 5 per hour
            quote: ActionPolicy::new(10, Duration::from_secs(3600), FailureMode::Closed), // 10 per hour
        }
    }
}

impl RateLimitConfig {
    pub fn get(&self, action: RateLimitAction) -> ActionPolicy {
        match action {
            RateLimitAction::Search => self.search,
            RateLimitAction::ProfileView => self.profile_view,
            RateLimitAction::Review => self.review,
            RateLimitAction::Quote => self.quote,
        }
    }

    pub fn set_policy(&mut self, action: RateLimitAction, policy: RateLimitPolicy) {
        let slot = match action {
            RateLimitAction::Search => &mut self.search,
            RateLimitAction::ProfileView => &mut self.profile_view,
            RateLimitAction::Review => &mut self.review,
            RateLimitAction::Quote => &mut self.quote,
        };
        slot.policy = policy;
    }
}

/// Rate limiter over an owned bucket store.
pub struct RateLimiter {
    store: BucketStore,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter.
    pub fn new(store: BucketStore, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &BucketStore {
        &self.store
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count one request for `key` under `policy`.
    ///
    /// Never fails: a policy that cannot admit anything, or a key the store
    /// has no room for, is denied.
    pub fn check_rate_limit(&self, key: &str, policy: &RateLimitPolicy) -> RateLimitDecision {
        self.check_rate_limit_at(key, policy, now_ms())
    }

    pub fn check_rate_limit_at(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> RateLimitDecision {
        match self.store.hit(key, policy, now_ms) {
            Ok(decision) => decision,
            Err(e) => {
                debug!(key = %key, error = %e, "rate limit check failed, denying request");
                RateLimitDecision::deny()
            }
        }
    }

    /// Count one `action` request from `client`, honouring the action's
    /// failure mode.
    pub fn check(&self, action: RateLimitAction, client: &str) -> RateLimitDecision {
        self.check_at(action, client, now_ms())
    }

    pub fn check_at(&self, action: RateLimitAction, client: &str, now_ms: i64) -> RateLimitDecision {
        let ActionPolicy {
            policy,
            failure_mode,
        } = self.config.get(action);
        let key = rate_limit_key(action, client);

        let decision = match self.store.hit(&key, &policy, now_ms) {
            Ok(decision) => decision,
            Err(e) => match failure_mode {
                FailureMode::Open => {
                    warn!(action = %action, error = %e, "rate limit check failed, allowing request");
                    RateLimitDecision {
                        allowed: true,
                        remaining: policy.max_requests,
                        reset_after_ms: 0,
                    }
                }
                FailureMode::Closed => {
                    warn!(action = %action, error = %e, "rate limit check failed, denying request");
                    RateLimitDecision::deny()
                }
            },
        };

        if !decision.allowed {
            debug!(
                action = %action,
                client = client,
                limit = policy.max_requests,
                "rate limit exceeded"
            );
        }

        decision
    }

    /// Drop expired buckets.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired(now_ms())
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}

/// Bucket key for an action and client.
pub fn rate_limit_key(action: RateLimitAction, client: &str) -> String {
    format!("{action}:{client}")
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(BucketStore::default(), RateLimitConfig::default())
    }

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.review.policy.max_requests, 5);
        assert_eq!(config.review.failure_mode, FailureMode::Closed);
        assert_eq!(config.profile_view.failure_mode, FailureMode::Open);
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            rate_limit_key(RateLimitAction::ProfileView, "10.0.0.1"),
            "profile_view:10.0.0.1"
        );
    }

    #[test]
    fn test_actions_counted_separately() {
        let limiter = limiter();
        for _ in 0..5 {
            assert!(limiter.check_at(RateLimitAction::Review, "ip", 0).allowed);
        }
        assert!(!limiter.check_at(RateLimitAction::Review, "ip", 0).allowed);
        assert!(limiter.check_at(RateLimitAction::Quote, "ip", 0).allowed);
        assert!(limiter.check_at(RateLimitAction::Review, "other", 0).allowed);
    }

    #[test]
    fn test_zero_policy_fails_by_mode() {
        let mut config = RateLimitConfig::default();
        let zero = RateLimitPolicy::new(0, Duration::from_secs(60));
        config.set_policy(RateLimitAction::ProfileView, zero);
        config.set_policy(RateLimitAction::Review, zero);
        let limiter = RateLimiter::new(BucketStore::default(), config);

        assert!(limiter.check_at(RateLimitAction::ProfileView, "ip", 0).allowed);
        assert!(!limiter.check_at(RateLimitAction::Review, "ip", 0).allowed);
        assert!(!limiter.check_rate_limit_at("raw", &zero, 0).allowed);
    }

    #[test]
    fn test_full_store_fails_by_mode() {
        let limiter = RateLimiter::new(BucketStore::new(1), RateLimitConfig::default());
        assert!(limiter.check_at(RateLimitAction::Search, "a", 0).allowed);

        assert!(limiter.check_at(RateLimitAction::ProfileView, "b", 0).allowed);
        assert!(!limiter.check_at(RateLimitAction::Quote, "b", 0).allowed);
        assert_eq!(limiter.store().len(), 1);
    }

    #[test]
    fn test_debug_reports_store() {
        let limiter = limiter();
        limiter.check_at(RateLimitAction::Search, "a", 0);
        let out = format!("{limiter:?}");
        assert!(out.starts_with("RateLimiter"));
        assert!(out.contains("entries: 1"));
    }
}
