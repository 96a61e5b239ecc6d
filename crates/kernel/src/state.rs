//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::metrics::Metrics;
use crate::rate_limit::{BucketStore, RateLimiter};
use crate::services::Directory;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Providers, reviews and quote requests.
    directory: Directory,

    rate_limiter: RateLimiter,

    /// Prometheus metrics.
    metrics: Metrics,
}

impl AppState {
    /// Build state from configuration, loading the catalog if one is set.
    pub fn new(config: Config) -> Result<Self> {
        let directory = match &config.catalog_path {
            Some(path) => Directory::load(path).context("failed to load catalog")?,
            None => {
                info!("no CATALOG_PATH set, starting with an empty directory");
                Directory::default()
            }
        };
        Ok(Self::with_directory(config, directory))
    }

    /// Build state around an existing directory.
    pub fn with_directory(config: Config, directory: Directory) -> Self {
        let rate_limiter = RateLimiter::new(
            BucketStore::new(config.rate_limit_max_keys),
            config.rate_limits.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                directory,
                rate_limiter,
                metrics: Metrics::new(),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn directory(&self) -> &Directory {
        &self.inner.directory
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("directory", &self.inner.directory)
            .field("rate_limiter", &self.inner.rate_limiter)
            .finish()
    }
}
