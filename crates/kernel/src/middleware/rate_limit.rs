//! HTTP glue for the rate limiter.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::rate_limit::{RateLimitAction, RateLimitDecision};
use crate::state::AppState;

/// Identifier of the request source, attached to every request by
/// [`resolve_client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

/// Middleware that derives the [`ClientId`] for the request.
pub async fn resolve_client(mut request: Request<Body>, next: Next) -> Response {
    let addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = get_client_id(addr, request.headers());
    request.extensions_mut().insert(ClientId(client));
    next.run(request).await
}

/// Count the request against `action`; a denial becomes a 429.
pub fn enforce(state: &AppState, action: RateLimitAction, client: &ClientId) -> AppResult<()> {
    let decision = state.rate_limiter().check(action, &client.0);
    if decision.allowed {
        return Ok(());
    }
    state.metrics().record_rate_limit(action);
    Err(AppError::RateLimited(decision))
}

/// Get the client identifier (IP address) for rate limiting.
pub fn get_client_id(addr: Option<SocketAddr>, headers: &HeaderMap) -> String {
    // Check X-Forwarded-For header first (for proxied requests)
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next().map(str::trim)
        && !ip.is_empty()
    {
        return ip.to_string();
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
        && !value.trim().is_empty()
    {
        return value.trim().to_string();
    }

    // Fall back to connection address
    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limit exceeded response.
pub fn rate_limit_response(decision: &RateLimitDecision) -> Response {
    let retry_after = decision.retry_after_secs();
    (
        StatusCode::TOO_MANY_REQUESTS,
        [
            ("retry-after", retry_after.to_string()),
            ("content-type", "application/json".to_string()),
        ],
        format!(r#"{{"error":"Rate limit exceeded","retry_after":{retry_after}}}"#),
    )
        .into_response()
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(get_client_id(Some(addr), &headers), "203.0.113.9");
    }

    #[test]
    fn test_client_id_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());
        assert_eq!(get_client_id(None, &headers), "198.51.100.4");

        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(get_client_id(Some(addr), &HeaderMap::new()), "127.0.0.1");
        assert_eq!(get_client_id(None, &HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_rate_limit_response() {
        let response = rate_limit_response(&RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_after_ms: 30_500,
        });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "31");
    }
}
