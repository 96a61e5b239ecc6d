//! Prometheus metrics collection.
//!
//! Provides application metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

use crate::rate_limit::RateLimitAction;

/// Path label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub path: String,
    pub status: u16,
}

/// Rate limit labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ActionLabels {
    pub action: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// HTTP request counter by method/path/status.
    pub http_requests: Family<HttpLabels, Counter>,

    /// HTTP request duration histogram.
    pub http_duration_seconds: Family<HttpLabels, Histogram>,

    /// Rate limit rejections by action.
    pub rate_limit_rejections: Family<ActionLabels, Counter>,

    /// Searches served.
    pub searches: Counter,

    /// Reviews accepted.
    pub reviews: Counter,

    /// Quote requests accepted.
    pub quotes: Counter,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests = Family::<HttpLabels, Counter>::default();
        registry.register(
            "http_requests",
            "Total HTTP requests",
            http_requests.clone(),
        );

        let http_duration_seconds = Family::<HttpLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 12))
        });
        registry.register(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_duration_seconds.clone(),
        );

        let rate_limit_rejections = Family::<ActionLabels, Counter>::default();
        registry.register(
            "rate_limit_rejections",
            "Rate limit rejections",
            rate_limit_rejections.clone(),
        );

        let searches = Counter::default();
        registry.register("searches", "Provider searches served", searches.clone());

        let reviews = Counter::default();
        registry.register("reviews", "Reviews accepted", reviews.clone());

        let quotes = Counter::default();
        registry.register("quotes", "Quote requests accepted", quotes.clone());

        Self {
            registry,
            http_requests,
            http_duration_seconds,
            rate_limit_rejections,
            searches,
            reviews,
            quotes,
        }
    }

    /// Record an HTTP request.
    ///
    /// `route` must come from a bounded set (a route template or
    /// [`UNMATCHED_ROUTE`]), never the raw request path.
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: route.to_string(),
            status,
        };

        self.http_requests.get_or_create(&labels).inc();
        self.http_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a rate limit rejection.
    pub fn record_rate_limit(&self, action: RateLimitAction) {
        self.rate_limit_rejections
            .get_or_create(&ActionLabels {
                action: action.as_str().to_string(),
            })
            .inc();
    }

    pub fn record_search(&self) {
        self.searches.inc();
    }

    pub fn record_review(&self) {
        self.reviews.inc();
    }

    pub fn record_quote(&self) {
        self.quotes.inc();
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible, and all metric
    /// labels use derived `EncodeLabelSet` impls that do not produce
    /// `fmt::Error`.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        metrics.record_search();

        let output = metrics.encode();
        assert!(output.lines().any(|l| l == "searches_total 1"));
        assert!(output.lines().any(|l| l.starts_with("quotes_total ")));
        assert!(!output.contains("_total_total"));
    }

    #[test]
    fn test_record_request_labels() {
        let metrics = Metrics::new();
        metrics.record_request("GET", "/api/providers/{id}", 200, 0.01);
        metrics.record_request("GET", UNMATCHED_ROUTE, 404, 0.01);

        let output = metrics.encode();
        assert!(output.lines().any(|l| {
            l.starts_with("http_requests_total{") && l.contains(r#"path="/api/providers/{id}""#)
        }));
        assert!(output.contains(r#"path="unmatched""#));
    }

    #[test]
    fn test_record_rate_limit() {
        let metrics = Metrics::new();
        metrics.record_rate_limit(RateLimitAction::Review);

        let output = metrics.encode();
        assert!(
            output
                .lines()
                .any(|l| l.starts_with("rate_limit_rejections_total{") && l.contains(r#"action="review""#))
        );
    }
}
