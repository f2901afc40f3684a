//! OpenAPI Specification for the Helperbase API
//!
//! Generated by utoipa from the route annotations and schema derives.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::DEFAULT_SESSION_COOKIE;
use crate::error::{ApiError, ErrorCode};
use crate::types::*;

use crate::routes::{
    cache, dashboard, forms, health, helpers, incidents, session, users,
};
use crate::telemetry::metrics;

use helperbase_core::{
    Action, DashboardMetrics, Helper, HelperStatus, Incident, IncidentSeverity, IncidentStatus,
    Permissions, Role, UserProfile,
};

/// OpenAPI document for the Helperbase API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Helperbase API",
        description = "Records of domestic helpers, the incidents filed against their employment, and the staff who manage them",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Session", description = "Login, logout and the current user"),
        (name = "Helpers", description = "Helper records"),
        (name = "Incidents", description = "Incidents filed against helpers"),
        (name = "Users", description = "System user management (admin only)"),
        (name = "Dashboard", description = "Aggregate counts"),
        (name = "Forms", description = "Step-by-step validation for the helper and incident forms"),
        (name = "Cache", description = "Record cache inspection and invalidation (admin only)"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        session::login,
        session::me,
        session::logout,

        helpers::list_helpers,
        helpers::create_helper,
        helpers::get_helper,
        helpers::update_helper,
        helpers::delete_helper,
        helpers::list_helper_incidents,

        incidents::list_incidents,
        incidents::create_incident,
        incidents::get_incident,
        incidents::update_incident,
        incidents::delete_incident,

        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,

        dashboard::get_dashboard_metrics,

        forms::validate_helper_form_step,
        forms::validate_incident_form_step,

        cache::cache_stats,
        cache::invalidate_cache,

        health::ping,
        health::liveness,
        health::readiness,

        metrics::metrics_handler,
    ),
    components(
        schemas(
            ApiError,
            ErrorCode,

            Role,
            Action,
            Permissions,
            HelperStatus,
            IncidentSeverity,
            IncidentStatus,
            Helper,
            Incident,
            UserProfile,
            DashboardMetrics,

            LoginRequest,
            LoginResponse,
            SessionResponse,
            CreateHelperRequest,
            UpdateHelperRequest,
            ListHelpersResponse,
            CreateIncidentRequest,
            UpdateIncidentRequest,
            ListIncidentsResponse,
            CreateUserRequest,
            UpdateUserRequest,
            ListUsersResponse,
            HelperFormDraft,
            IncidentFormDraft,
            FieldError,
            StepValidationResponse,
            CacheStatsResponse,
            InvalidateCacheRequest,
            InvalidateCacheResponse,

            health::HealthResponse,
            health::HealthStatus,
            health::HealthDetails,
            health::ComponentHealth,
            health::CacheHealth,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the bearer token and session cookie schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token from /api/v1/session/login"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(DEFAULT_SESSION_COOKIE))),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Helperbase API");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 9);
        Ok(())
    }

    #[test]
    fn test_openapi_has_core_paths() {
        let openapi = ApiDoc::openapi();
        for path in [
            "/api/v1/session/login",
            "/api/v1/helpers/{id}",
            "/api/v1/helpers/{id}/incidents",
            "/api/v1/forms/incident/steps/{step}/validate",
            "/api/v1/cache/invalidate",
            "/health/ready",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_openapi_security_schemes() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.security_schemes.contains_key("session_cookie"));
        assert!(components.schemas.contains_key("Helper"));
        Ok(())
    }

    #[test]
    fn test_openapi_to_json() -> Result<(), serde_json::Error> {
        let json = ApiDoc::to_json()?;
        assert!(json.contains("Helperbase API"));
        Ok(())
    }
}
