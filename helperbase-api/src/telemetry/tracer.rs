//! Tracing Subscriber Initialization
//!
//! Logs go to stdout as JSON by default, filtered by `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::env_flag;
use crate::error::{ApiError, ApiResult};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "helperbase_api=debug,tower_http=info,info";

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (production, staging, development)
    pub environment: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
    /// Serve `/metrics`
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("HELPERBASE_SERVICE_NAME")
                .unwrap_or_else(|_| "helperbase-api".to_string()),
            service_version: std::env::var("HELPERBASE_SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            environment: std::env::var("HELPERBASE_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            json_logs: !std::env::var("HELPERBASE_LOG_FORMAT")
                .is_ok_and(|s| s.trim().eq_ignore_ascii_case("pretty")),
            metrics_enabled: env_flag("HELPERBASE_METRICS_ENABLED", true),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup. A second call fails because a global subscriber
/// is already set.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json_layer = config.json_logs.then(|| fmt::layer().json());
    let pretty_layer = (!config.json_logs).then(fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = %config.service_name,
        service_version = %config.service_version,
        environment = %config.environment,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EnvVarGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let original = std::env::var(key).ok();
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
            Self { key, original }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.original.as_deref() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn test_telemetry_config_from_env() {
        let _name = EnvVarGuard::set("HELPERBASE_SERVICE_NAME", None);
        let format = EnvVarGuard::set("HELPERBASE_LOG_FORMAT", None);
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "helperbase-api");
        assert!(config.json_logs);
        drop(format);

        let _format = EnvVarGuard::set("HELPERBASE_LOG_FORMAT", Some("Pretty"));
        assert!(!TelemetryConfig::default().json_logs);
    }

    #[test]
    fn test_init_tracing_twice_fails() {
        let config = TelemetryConfig {
            json_logs: false,
            ..TelemetryConfig::default()
        };
        // Another test may have installed a subscriber first.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
