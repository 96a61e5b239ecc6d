//! Tradesfinder Kernel Library
//!
//! Provider search and ranking, plan tiering, in-process rate limiting,
//! and the JSON API built on them. The `tradesfinder` binary serves the API.

pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;
pub mod tiering;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
