//! Prometheus Metrics Definitions
//!
//! Request, session and cache metrics, exposed on `/metrics`.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge_vec, CounterVec, Encoder,
    HistogramVec, IntGaugeVec, TextEncoder,
};

use helperbase_storage::CacheStats;

use crate::cached_store::CachedStore;
use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance, registered on first use.
pub static METRICS: Lazy<ApiResult<HelperbaseMetrics>> = Lazy::new(HelperbaseMetrics::new);

/// The registered metrics, or `None` if registration failed.
///
/// Registration failure is logged once; recording then becomes a no-op.
pub fn metrics() -> Option<&'static HelperbaseMetrics> {
    static REPORTED: std::sync::Once = std::sync::Once::new();
    match METRICS.as_ref() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            REPORTED.call_once(|| tracing::error!(error = %e, "Metrics registration failed"));
            None
        }
    }
}

/// Container for all Helperbase metrics.
#[derive(Clone)]
pub struct HelperbaseMetrics {
    /// Labels: method, path, status
    pub http_requests_total: CounterVec,

    /// Labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Labels: outcome (success/failure)
    pub login_attempts_total: CounterVec,

    /// Labels: role, action
    pub permission_denials_total: CounterVec,

    /// Labels: scope (ip/user)
    pub rate_limited_total: CounterVec,

    /// Cache counters, copied from the cache on every scrape.
    /// Labels: stat (size/max_size/hits/misses/evictions/expirations)
    pub cache_stats: IntGaugeVec,
}

impl HelperbaseMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        let registration_failed =
            |name: &str, e: prometheus::Error| ApiError::internal_error(format!("Failed to register {}: {}", name, e));

        Ok(Self {
            http_requests_total: register_counter_vec!(
                "helperbase_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_failed("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "helperbase_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_failed("http_request_duration_seconds", e))?,

            login_attempts_total: register_counter_vec!(
                "helperbase_login_attempts_total",
                "Login attempts by outcome",
                &["outcome"]
            )
            .map_err(|e| registration_failed("login_attempts_total", e))?,

            permission_denials_total: register_counter_vec!(
                "helperbase_permission_denials_total",
                "Requests refused by the access policy",
                &["role", "action"]
            )
            .map_err(|e| registration_failed("permission_denials_total", e))?,

            rate_limited_total: register_counter_vec!(
                "helperbase_rate_limited_total",
                "Requests rejected by rate limiting",
                &["scope"]
            )
            .map_err(|e| registration_failed("rate_limited_total", e))?,

            cache_stats: register_int_gauge_vec!(
                "helperbase_cache_stats",
                "Record cache statistics",
                &["stat"]
            )
            .map_err(|e| registration_failed("cache_stats", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    pub fn record_login(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.login_attempts_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_permission_denied(&self, role: &str, action: &str) {
        self.permission_denials_total
            .with_label_values(&[role, action])
            .inc();
    }

    pub fn record_rate_limited(&self, scope: &str) {
        self.rate_limited_total.with_label_values(&[scope]).inc();
    }

    /// Copy a cache snapshot into the `cache_stats` gauges.
    pub fn set_cache_stats(&self, stats: &CacheStats) {
        let as_gauge = |n: u64| i64::try_from(n).unwrap_or(i64::MAX);
        for (label, value) in [
            ("size", as_gauge(stats.size as u64)),
            ("max_size", as_gauge(stats.max_size as u64)),
            ("hits", as_gauge(stats.hits)),
            ("misses", as_gauge(stats.misses)),
            ("evictions", as_gauge(stats.evictions)),
            ("expirations", as_gauge(stats.expirations)),
        ] {
            self.cache_stats.with_label_values(&[label]).set(value);
        }
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler(State(store): State<CachedStore>) -> impl IntoResponse {
    if let Some(metrics) = metrics() {
        metrics.set_cache_stats(&store.cache().stats());
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Collector;
    use std::time::Duration;

    fn registered() -> Result<&'static HelperbaseMetrics, String> {
        METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))
    }

    #[test]
    fn test_metrics_creation() -> Result<(), String> {
        let metrics = registered()?;
        assert!(!metrics.http_requests_total.desc().is_empty());
        assert!(!metrics.cache_stats.desc().is_empty());
        Ok(())
    }

    #[test]
    fn test_record_http_request() -> Result<(), String> {
        let metrics = registered()?;
        let before = metrics
            .http_requests_total
            .with_label_values(&["GET", "/test/record", "200"])
            .get();
        metrics.record_http_request("GET", "/test/record", 200, 0.015);
        let after = metrics
            .http_requests_total
            .with_label_values(&["GET", "/test/record", "200"])
            .get();
        assert_eq!(after - before, 1.0);
        Ok(())
    }

    #[test]
    fn test_session_counters() -> Result<(), String> {
        let metrics = registered()?;
        metrics.record_login(true);
        metrics.record_login(false);
        metrics.record_permission_denied("viewer", "delete");
        metrics.record_rate_limited("ip");
        assert!(metrics.login_attempts_total.with_label_values(&["failure"]).get() >= 1.0);
        Ok(())
    }

    #[test]
    fn test_cache_stats_are_copied() -> Result<(), String> {
        let metrics = registered()?;
        metrics.set_cache_stats(&CacheStats {
            size: 3,
            max_size: 100,
            ttl: Duration::from_secs(300),
            hits: 7,
            misses: 2,
            evictions: 0,
            expirations: 1,
        });
        assert_eq!(metrics.cache_stats.with_label_values(&["max_size"]).get(), 100);
        assert_eq!(metrics.cache_stats.with_label_values(&["expirations"]).get(), 1);
        Ok(())
    }
}
