//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use crate::rate_limit::{DEFAULT_MAX_KEYS, RateLimitAction, RateLimitConfig, RateLimitPolicy};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// JSON catalog of providers and reviews. When None, the directory starts empty.
    pub catalog_path: Option<PathBuf>,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Bearer token for admin routes. When None, admin routes always reject.
    pub admin_token: Option<String>,

    /// Country calling code applied to numbers with a trunk prefix (default: 44).
    pub default_country_code: String,

    /// ISO currency code for displayed prices (default: GBP).
    pub currency: String,

    /// Per-action rate limits.
    pub rate_limits: RateLimitConfig,

    /// Soft cap on tracked rate limit keys (default: 100000).
    pub rate_limit_max_keys: usize,

    /// Seconds between expired-bucket purges (default: 60).
    pub rate_limit_purge_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let catalog_path = env::var("CATALOG_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let admin_token = env::var("ADMIN_TOKEN").ok().filter(|v| !v.is_empty());

        let default_country_code = env::var("DEFAULT_COUNTRY_CODE")
            .unwrap_or_else(|_| "44".to_string())
            .trim()
            .trim_start_matches('+')
            .to_string();
        if default_country_code.is_empty()
            || !default_country_code.chars().all(|c| c.is_ascii_digit())
        {
            anyhow::bail!("DEFAULT_COUNTRY_CODE must be digits, got {default_country_code:?}");
        }

        let currency = env::var("CURRENCY")
            .unwrap_or_else(|_| "GBP".to_string())
            .trim()
            .to_ascii_uppercase();

        let mut rate_limits = RateLimitConfig::default();
        for action in RateLimitAction::ALL {
            let var = format!("RATE_LIMIT_{}", action.env_suffix());
            let Ok(value) = env::var(&var) else {
                continue;
            };
            let policy = RateLimitPolicy::parse(&value)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("{var} must be <max>/<window_secs>"))?;
            if policy.validate().is_err() {
                warn!(
                    action = %action,
                    value = %value,
                    failure_mode = ?rate_limits.get(action).failure_mode,
                    "rate limit policy admits no requests"
                );
            }
            rate_limits.set_policy(action, policy);
        }

        let rate_limit_max_keys = env::var("RATE_LIMIT_MAX_KEYS")
            .unwrap_or_else(|_| DEFAULT_MAX_KEYS.to_string())
            .parse()
            .context("RATE_LIMIT_MAX_KEYS must be a valid usize")?;

        let rate_limit_purge_secs = env::var("RATE_LIMIT_PURGE_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .context("RATE_LIMIT_PURGE_SECS must be a valid u64")?
            .max(1);

        Ok(Self {
            port,
            catalog_path,
            cors_allowed_origins,
            admin_token,
            default_country_code,
            currency,
            rate_limits,
            rate_limit_max_keys,
            rate_limit_purge_secs,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            catalog_path: None,
            cors_allowed_origins: vec!["*".to_string()],
            admin_token: None,
            default_country_code: "44".to_string(),
            currency: "GBP".to_string(),
            rate_limits: RateLimitConfig::default(),
            rate_limit_max_keys: DEFAULT_MAX_KEYS,
            rate_limit_purge_secs: 60,
        }
    }
}
