//! Rate Limiting Middleware
//!
//! Quotas are per client IP for anonymous requests and per user once a
//! session is authenticated. Limiters live in a `DashMap` and are created
//! on first use.

use crate::auth::AuthContext;
use crate::config::ApiConfig;
use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{clock::DefaultClock, Quota, RateLimiter};
use helperbase_core::UserId;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

/// What a quota is charged against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RateLimitKey {
    /// Unauthenticated request, keyed by client IP
    Ip(IpAddr),
    /// Authenticated request, keyed by user
    User(UserId),
}

/// State for rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitState {
    config: Arc<ApiConfig>,
    limiters: Arc<DashMap<RateLimitKey, Arc<DirectRateLimiter>>>,
}

impl RateLimitState {
    pub fn new(config: Arc<ApiConfig>) -> Self {
        Self {
            config,
            limiters: Arc::new(DashMap::new()),
        }
    }

    fn requests_per_minute(&self, key: &RateLimitKey) -> u32 {
        match key {
            RateLimitKey::Ip(_) => self.config.rate_limit_unauthenticated,
            RateLimitKey::User(_) => self.config.rate_limit_authenticated,
        }
    }

    fn limiter_for(&self, key: &RateLimitKey) -> Arc<DirectRateLimiter> {
        let limiter = self.limiters.entry(key.clone()).or_insert_with(|| {
            let quota = Quota::per_minute(
                NonZeroU32::new(self.requests_per_minute(key)).unwrap_or(NonZeroU32::MIN),
            )
            .allow_burst(NonZeroU32::new(self.config.rate_limit_burst).unwrap_or(NonZeroU32::MIN));
            Arc::new(RateLimiter::direct(quota))
        });
        limiter.clone()
    }

    /// Number of keys with a live limiter.
    pub fn tracked_keys(&self) -> usize {
        self.limiters.len()
    }
}

/// Rejection produced when a quota is exhausted.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitError {
    /// Seconds until the next request would be admitted
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let error = ApiError::too_many_requests(Some(self.retry_after));
        let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(error)).into_response();
        response.headers_mut().insert(
            HeaderName::from_static("retry-after"),
            HeaderValue::from_str(&self.retry_after.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("60")),
        );
        response
    }
}

/// Client IP, honouring `X-Forwarded-For` then `X-Real-IP`.
fn extract_client_ip(request: &Request, fallback: Option<SocketAddr>) -> IpAddr {
    let header_ip = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .or_else(|| fallback.map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rate limiting middleware.
///
/// Requests carrying an [`AuthContext`] are charged to the user, others to
/// the client IP. Rejected requests get 429 with `Retry-After`; admitted
/// ones get `X-RateLimit-Limit`.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    if !state.config.rate_limit_enabled {
        return Ok(next.run(request).await);
    }

    let key = match request.extensions().get::<AuthContext>() {
        Some(auth) => RateLimitKey::User(auth.user_id),
        None => RateLimitKey::Ip(extract_client_ip(&request, connect_info.map(|c| c.0))),
    };

    match state.limiter_for(&key).check() {
        Ok(_) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(state.requests_per_minute(&key)),
            );
            Ok(response)
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(governor::clock::Clock::now(&DefaultClock::default()))
                .as_secs()
                .max(1);
            tracing::warn!(key = ?key, retry_after, "Rate limit exceeded");
            if let Some(metrics) = crate::telemetry::metrics() {
                let scope = match key {
                    RateLimitKey::Ip(_) => "ip",
                    RateLimitKey::User(_) => "user",
                };
                metrics.record_rate_limited(scope);
            }
            Err(RateLimitError { retry_after })
        }
    }
}
