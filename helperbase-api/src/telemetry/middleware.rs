//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Every request runs inside an `http_request` span and is counted in
//! Prometheus under its normalized route.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::metrics;

static UUID_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}").ok()
});

static NUMERIC_SEGMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/\d+(/|$)").ok());

/// Normalize a path for metric labels and span names.
///
/// UUIDs and numeric segments become `{id}` so label cardinality stays
/// bounded.
fn normalize_path(path: &str) -> String {
    let mut result = path.to_string();
    if let Some(uuid) = UUID_PATTERN.as_ref() {
        result = uuid.replace_all(&result, "{id}").into_owned();
    }
    if let Some(numeric) = NUMERIC_SEGMENT.as_ref() {
        result = numeric.replace_all(&result, "/{id}$1").into_owned();
    }
    result
}

/// Observability middleware for Axum.
///
/// Wraps the request in a tracing span, records request count and latency,
/// and logs one line per completed request.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Some(metrics) = metrics() {
        metrics.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/helpers/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/helpers/{id}");
    }

    #[test]
    fn test_normalize_path_step_number() {
        let path = "/api/v1/forms/helper/steps/2/validate";
        assert_eq!(normalize_path(path), "/api/v1/forms/helper/steps/{id}/validate");
    }

    #[test]
    fn test_normalize_path_mixed() {
        let path = "/api/v1/helpers/550e8400-e29b-41d4-a716-446655440000/incidents";
        assert_eq!(normalize_path(path), "/api/v1/helpers/{id}/incidents");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/helpers"), "/api/v1/helpers");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
