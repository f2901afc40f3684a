//! API Configuration Module
//!
//! CORS, rate limiting and cache sizing. Configuration is loaded from
//! environment variables with defaults suitable for local development.

use std::time::Duration;

use helperbase_core::ConfigError;
use helperbase_storage::CacheConfig;

/// Read and parse an environment variable, falling back when unset or
/// unparseable.
pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a boolean flag. Only the literal `true` (any case) enables it.
pub(crate) fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, rate limiting and the record cache.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Deployment environment name (`development`, `production`, ...).
    pub environment: String,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Rate Limiting Configuration
    // ========================================================================
    /// Whether rate limiting is enabled.
    pub rate_limit_enabled: bool,

    /// Rate limit for unauthenticated requests (per IP, per minute).
    pub rate_limit_unauthenticated: u32,

    /// Rate limit for authenticated requests (per user, per minute).
    pub rate_limit_authenticated: u32,

    /// Burst capacity (allow this many requests beyond the limit temporarily).
    pub rate_limit_burst: u32,

    /// Window size for rate limiting.
    pub rate_limit_window: Duration,

    // ========================================================================
    // Cache Configuration
    // ========================================================================
    /// Time-to-live of cached record-store reads.
    pub cache_ttl: Duration,

    /// Maximum number of cached reads.
    pub cache_max_entries: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),

            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,

            rate_limit_enabled: true,
            rate_limit_unauthenticated: 100,
            rate_limit_authenticated: 1000,
            rate_limit_burst: 10,
            rate_limit_window: Duration::from_secs(60),

            cache_ttl: Duration::from_secs(5 * 60),
            cache_max_entries: 100,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `HELPERBASE_ENVIRONMENT`: deployment name (default: development)
    /// - `HELPERBASE_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `HELPERBASE_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `HELPERBASE_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `HELPERBASE_RATE_LIMIT_ENABLED`: "true" or "false" (default: true)
    /// - `HELPERBASE_RATE_LIMIT_UNAUTHENTICATED`: Requests per minute per IP (default: 100)
    /// - `HELPERBASE_RATE_LIMIT_AUTHENTICATED`: Requests per minute per user (default: 1000)
    /// - `HELPERBASE_RATE_LIMIT_BURST`: Burst capacity (default: 10)
    /// - `HELPERBASE_CACHE_TTL_MINUTES`: Cache entry lifetime (default: 5)
    /// - `HELPERBASE_CACHE_MAX_ENTRIES`: Cache capacity (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("HELPERBASE_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let rate_limit_enabled = std::env::var("HELPERBASE_RATE_LIMIT_ENABLED")
            .ok()
            .map(|s| !s.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(defaults.rate_limit_enabled);

        let cache_ttl_minutes: u64 = env_or("HELPERBASE_CACHE_TTL_MINUTES", 5);

        Self {
            environment: std::env::var("HELPERBASE_ENVIRONMENT")
                .map(|s| s.trim().to_lowercase())
                .unwrap_or(defaults.environment),
            cors_origins,
            cors_allow_credentials: env_flag(
                "HELPERBASE_CORS_ALLOW_CREDENTIALS",
                defaults.cors_allow_credentials,
            ),
            cors_max_age_secs: env_or("HELPERBASE_CORS_MAX_AGE_SECS", defaults.cors_max_age_secs),
            rate_limit_enabled,
            rate_limit_unauthenticated: env_or(
                "HELPERBASE_RATE_LIMIT_UNAUTHENTICATED",
                defaults.rate_limit_unauthenticated,
            ),
            rate_limit_authenticated: env_or(
                "HELPERBASE_RATE_LIMIT_AUTHENTICATED",
                defaults.rate_limit_authenticated,
            ),
            rate_limit_burst: env_or("HELPERBASE_RATE_LIMIT_BURST", defaults.rate_limit_burst),
            rate_limit_window: defaults.rate_limit_window,
            cache_ttl: Duration::from_secs(cache_ttl_minutes.saturating_mul(60)),
            cache_max_entries: env_or("HELPERBASE_CACHE_MAX_ENTRIES", defaults.cache_max_entries),
        }
    }

    /// Whether this is a production deployment.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Reject settings that are only acceptable in development.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.cors_origins.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "HELPERBASE_CORS_ORIGINS".to_string(),
            });
        }
        Ok(())
    }

    /// Settings for the shared record cache.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_ttl(self.cache_ttl)
            .with_max_entries(self.cache_max_entries)
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // *.example.org matches any https subdomain of example.org
            if let Some(domain) = allowed.strip_prefix("*.") {
                if let Some(origin_host) = origin.strip_prefix("https://") {
                    return origin_host
                        .strip_suffix(domain)
                        .is_some_and(|prefix| prefix.ends_with('.'));
                }
            }
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert!(config.rate_limit_enabled);
        assert_eq!(config.rate_limit_unauthenticated, 100);
        assert_eq!(config.rate_limit_authenticated, 1000);
        assert_eq!(config.rate_limit_burst, 10);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.cache_max_entries, 100);
    }

    #[test]
    fn test_cache_config_follows_api_config() {
        let config = ApiConfig {
            cache_ttl: Duration::from_secs(60),
            cache_max_entries: 7,
            ..ApiConfig::default()
        };
        let cache = config.cache_config();
        assert_eq!(cache.ttl, Duration::from_secs(60));
        assert_eq!(cache.max_entries, 7);
    }

    #[test]
    fn test_production_requires_explicit_origins() {
        let mut config = ApiConfig {
            environment: "production".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://hr.example.org".to_string()];
        assert!(config.validate().is_ok());
        assert!(ApiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_origin_allowed_dev_mode() {
        let config = ApiConfig::default();
        assert!(config.is_origin_allowed("https://anything.com"));
        assert!(config.is_origin_allowed("http://localhost:3000"));
    }

    #[test]
    fn test_origin_allowed_production() {
        let config = ApiConfig {
            cors_origins: vec![
                "https://helperbase.org".to_string(),
                "https://app.helperbase.org".to_string(),
            ],
            ..ApiConfig::default()
        };

        assert!(config.is_origin_allowed("https://helperbase.org"));
        assert!(config.is_origin_allowed("https://app.helperbase.org"));
        assert!(!config.is_origin_allowed("https://evil.com"));
        assert!(!config.is_origin_allowed("https://nothelperbase.org"));
    }

    #[test]
    fn test_wildcard_subdomain() {
        let config = ApiConfig {
            cors_origins: vec!["*.helperbase.org".to_string()],
            ..ApiConfig::default()
        };

        assert!(config.is_origin_allowed("https://app.helperbase.org"));
        assert!(config.is_origin_allowed("https://api.helperbase.org"));
        assert!(!config.is_origin_allowed("https://nothelperbase.org"));
        assert!(!config.is_origin_allowed("http://app.helperbase.org"));
    }
}
