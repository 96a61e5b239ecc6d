//! Fixed-window counter table.
//!
//! Buckets are created lazily on the first hit for a key and restarted
//! once their window has elapsed. Mutations go through `DashMap::entry`,
//! which holds the shard write lock for the duration of the update, so
//! concurrent hits on one key are serialized and never lose a count.

use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default soft cap on the number of tracked keys.
pub const DEFAULT_MAX_KEYS: usize = 100_000;

/// Conditions under which the limiter cannot reach a decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("invalid rate limit policy (max_requests={max_requests}, window_ms={window_ms})")]
    InvalidPolicy { max_requests: u32, window_ms: u64 },

    #[error("rate limit store is full ({capacity} keys)")]
    StoreFull { capacity: usize },
}

/// Count ceiling per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Length of the window in milliseconds.
    pub window_ms: u64,
    /// Requests allowed per window.
    pub max_requests: u32,
}

impl RateLimitPolicy {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            window_ms: window.as_millis() as u64,
            max_requests,
        }
    }

    /// A policy with a zero ceiling or a zero-length window is unusable.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        if self.max_requests == 0 || self.window_ms == 0 {
            return Err(RateLimitError::InvalidPolicy {
                max_requests: self.max_requests,
                window_ms: self.window_ms,
            });
        }
        Ok(())
    }

    /// Parse `"<max>/<window_secs>"`, e.g. `"5/60"`.
    pub fn parse(value: &str) -> Result<Self, String> {
        let (max, secs) = value
            .split_once('/')
            .ok_or_else(|| format!("expected <max>/<window_secs>, got {value:?}"))?;
        let max_requests = max
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid max requests {max:?}: {e}"))?;
        let window_secs = secs
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("invalid window {secs:?}: {e}"))?;
        Ok(Self {
            window_ms: window_secs.saturating_mul(1000),
            max_requests,
        })
    }
}

/// Outcome of a single hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Milliseconds until the current window ends.
    pub reset_after_ms: u64,
}

impl RateLimitDecision {
    pub(crate) fn deny() -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_after_ms: 0,
        }
    }

    /// Whole seconds to advertise in `Retry-After`, never less than one.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_after_ms.div_ceil(1000).max(1)
    }
}

/// Per-key counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitBucket {
    /// Unix milliseconds when the current window began.
    pub window_start_ms: i64,
    /// Requests observed in the current window.
    pub count: u32,
    window_ms: u64,
}

impl RateLimitBucket {
    fn start(now_ms: i64, window_ms: u64) -> Self {
        Self {
            window_start_ms: now_ms,
            count: 1,
            window_ms,
        }
    }

    fn window_end(&self) -> i64 {
        let window = i64::try_from(self.window_ms).unwrap_or(i64::MAX);
        self.window_start_ms.saturating_add(window)
    }

    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.window_end()
    }

    fn decide(&self, policy: &RateLimitPolicy, now_ms: i64) -> RateLimitDecision {
        let reset_after_ms = u64::try_from(self.window_end().saturating_sub(now_ms)).unwrap_or(0);
        RateLimitDecision {
            allowed: self.count <= policy.max_requests,
            remaining: policy.max_requests.saturating_sub(self.count),
            reset_after_ms,
        }
    }
}

/// Table of rate limit buckets keyed by subject.
///
/// The capacity is a soft cap: under concurrent inserts the table may
/// briefly exceed it by a few entries, because `DashMap::len` is summed
/// over shards without a global lock.
pub struct BucketStore {
    buckets: DashMap<String, RateLimitBucket>,
    max_keys: usize,
}

impl Default for BucketStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_KEYS)
    }
}

impl BucketStore {
    pub fn new(max_keys: usize) -> Self {
        Self {
            buckets: DashMap::new(),
            max_keys,
        }
    }

    /// Record one request for `key` at `now_ms`.
    pub fn hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> Result<RateLimitDecision, RateLimitError> {
        policy.validate()?;

        // Must run before `entry()`: `len()` read-locks every shard.
        if !self.buckets.contains_key(key) && self.buckets.len() >= self.max_keys {
            self.purge_expired(now_ms);
            if self.buckets.len() >= self.max_keys {
                return Err(RateLimitError::StoreFull {
                    capacity: self.max_keys,
                });
            }
        }

        let decision = match self.buckets.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                let bucket = RateLimitBucket::start(now_ms, policy.window_ms);
                slot.insert(bucket);
                bucket.decide(policy, now_ms)
            }
            Entry::Occupied(mut slot) => {
                let bucket = slot.get_mut();
                bucket.window_ms = policy.window_ms;
                if bucket.is_expired(now_ms) {
                    *bucket = RateLimitBucket::start(now_ms, policy.window_ms);
                } else {
                    bucket.count = bucket.count.saturating_add(1);
                }
                bucket.decide(policy, now_ms)
            }
        };

        Ok(decision)
    }

    /// Drop every bucket whose window has elapsed. Returns how many were removed.
    pub fn purge_expired(&self, now_ms: i64) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.is_expired(now_ms));
        before.saturating_sub(self.buckets.len())
    }

    /// Snapshot of the bucket for `key`.
    pub fn get(&self, key: &str) -> Option<RateLimitBucket> {
        self.buckets.get(key).map(|b| *b)
    }

    /// Forget the bucket for `key`.
    pub fn reset(&self, key: &str) {
        self.buckets.remove(key);
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_keys
    }
}

impl std::fmt::Debug for BucketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketStore")
            .field("entries", &self.buckets.len())
            .field("max_keys", &self.max_keys)
            .finish()
    }
}
