//! Authentication Module
//!
//! Session handling for the Helperbase API:
//! 1. Password verification against argon2id PHC hashes
//! 2. HS256 session tokens carried in `Authorization: Bearer` or the
//!    session cookie
//! 3. [`AuthContext`], the per-request identity that route handlers check
//!    against the access policy

use crate::error::{ApiError, ApiResult};
use helperbase_core::{
    is_allowed, Action, ConfigError, HelperbaseError, Permissions, PolicyError, Role, User,
    UserId,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock abstraction for token time validation.
///
/// Token times are checked here rather than inside `jsonwebtoken` so tests
/// can pin the current time.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// Test clock helpers for common scenarios.
#[cfg(test)]
pub mod test_clocks {
    use super::FixedClock;

    /// 2024-01-01 00:00:00 UTC
    pub fn valid() -> FixedClock {
        FixedClock(1704067200)
    }

    /// 2030-01-01 00:00:00 UTC
    pub fn future() -> FixedClock {
        FixedClock(1893456000)
    }
}

// ============================================================================
// JWT SECRET
// ============================================================================

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

/// Signing secret that never appears in logs.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Create a new JWT secret.
    ///
    /// # Errors
    /// Returns error if the secret is empty.
    pub fn new(secret: String) -> Result<Self, HelperbaseError> {
        if secret.is_empty() {
            return Err(HelperbaseError::Config(ConfigError::MissingRequired {
                field: "jwt_secret".to_string(),
            }));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value for signing and verification only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

fn build_jwt_secret(secret_str: String) -> JwtSecret {
    if secret_str.trim().is_empty() {
        return JwtSecret(SecretString::new(INSECURE_DEFAULT_SECRET.into()));
    }
    JwtSecret(SecretString::new(secret_str.into()))
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Default name of the session cookie.
pub const DEFAULT_SESSION_COOKIE: &str = "helperbase_session";

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret key for signing and verifying session tokens
    pub jwt_secret: JwtSecret,

    /// Token algorithm (HS256)
    pub jwt_algorithm: Algorithm,

    /// Session lifetime in seconds (default: 8 hours)
    pub jwt_expiration_secs: i64,

    /// Tolerated clock drift when checking `exp` (default: 60)
    pub jwt_clock_skew_secs: i64,

    /// Name of the session cookie
    pub session_cookie_name: String,

    /// Whether the session cookie carries the `Secure` attribute
    pub secure_cookies: bool,

    /// Clock for token time validation (injected for testing)
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("secure_cookies", &self.secure_cookies)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: build_jwt_secret(String::new()),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 8 * 60 * 60,
            jwt_clock_skew_secs: 60,
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            secure_cookies: false,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `HELPERBASE_JWT_SECRET`: token signing secret
    /// - `HELPERBASE_JWT_EXPIRATION_SECS`: session lifetime (default: 28800)
    /// - `HELPERBASE_JWT_CLOCK_SKEW_SECS`: clock skew tolerance (default: 60)
    /// - `HELPERBASE_SESSION_COOKIE`: cookie name (default: helperbase_session)
    /// - `HELPERBASE_SECURE_COOKIES`: "true" to mark the cookie `Secure`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret_str = std::env::var("HELPERBASE_JWT_SECRET").unwrap_or_default();

        Self {
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: crate::config::env_or(
                "HELPERBASE_JWT_EXPIRATION_SECS",
                defaults.jwt_expiration_secs,
            ),
            jwt_clock_skew_secs: crate::config::env_or(
                "HELPERBASE_JWT_CLOCK_SKEW_SECS",
                defaults.jwt_clock_skew_secs,
            ),
            session_cookie_name: std::env::var("HELPERBASE_SESSION_COOKIE")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.session_cookie_name),
            secure_cookies: crate::config::env_flag("HELPERBASE_SECURE_COOKIES", false),
            clock: Arc::new(SystemClock),
        }
    }

    /// Refuse insecure signing secrets in production; warn about them
    /// elsewhere.
    pub fn validate_for_production(&self, is_production: bool) -> ApiResult<()> {
        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(
                    "Cannot start in production with the default JWT secret. \
                     Set HELPERBASE_JWT_SECRET to a secure value.",
                ));
            }
            tracing::warn!(
                "Using the default JWT secret. Set HELPERBASE_JWT_SECRET \
                 (at least 32 characters) before deploying."
            );
        } else if self.jwt_secret.len() < 32 {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least 32 characters long.",
                    self.jwt_secret.len()
                )));
            }
            tracing::warn!(
                chars = self.jwt_secret.len(),
                "JWT secret is short; use at least 32 characters in production"
            );
        }

        if is_production && !self.secure_cookies {
            tracing::warn!("Session cookie is not marked Secure in production");
        }

        Ok(())
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// Session token claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    pub email: String,

    pub name: String,

    /// Role at the time the session was issued
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for a session belonging to `user`.
    pub fn for_user(user: &User, expiration_secs: i64, clock: &dyn JwtClock) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            sub: user.user_id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iat: now,
            exp: now + expiration_secs,
        }
    }

    /// Check if the token has expired according to a clock.
    pub fn is_expired(&self, clock: &dyn JwtClock) -> bool {
        self.exp < clock.now_epoch_secs()
    }

    /// The subject as a typed user id.
    pub fn user_id(&self) -> ApiResult<UserId> {
        self.sub
            .parse()
            .map_err(|_| ApiError::invalid_token("Token subject is not a user id"))
    }
}

// ============================================================================
// AUTHENTICATION CONTEXT
// ============================================================================

/// Identity of the caller, inserted into request extensions by the auth
/// middleware.
///
/// The role comes from the stored user record, not the token, so a
/// demotion takes effect on the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }

    /// Whether the caller's role allows `action`.
    pub fn can(&self, action: Action) -> bool {
        is_allowed(self.role, action)
    }

    /// Fail with 403 unless the caller's role allows `action`.
    pub fn require(&self, action: Action) -> ApiResult<()> {
        if self.can(action) {
            return Ok(());
        }
        tracing::warn!(
            user_id = %self.user_id,
            role = %self.role,
            action = %action,
            "Permission denied"
        );
        if let Some(metrics) = crate::telemetry::metrics() {
            metrics.record_permission_denied(self.role.as_str(), action.as_str());
        }
        Err(HelperbaseError::from(PolicyError::Denied {
            role: self.role,
            action: action.to_string(),
        })
        .into())
    }

    /// Check if the caller has any of the specified roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        helperbase_core::has_any_role(self.role, roles)
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::for_role(self.role)
    }
}

// ============================================================================
// TOKENS
// ============================================================================

/// Validate claim times using our own clock.
fn validate_claim_times(now: i64, exp: i64, leeway_secs: i64) -> ApiResult<()> {
    if exp < now - leeway_secs {
        return Err(ApiError::token_expired());
    }
    Ok(())
}

/// Validate a session token and extract its claims.
///
/// `jsonwebtoken` checks the signature only; expiry is checked against
/// `config.clock`.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;
    let now = config.clock.now_epoch_secs();
    if now < 0 {
        tracing::error!(
            timestamp = now,
            "System clock returned pre-epoch time - server time is broken"
        );
        return Err(ApiError::internal_error("Server time configuration error"));
    }

    validate_claim_times(now, claims.exp, config.jwt_clock_skew_secs)?;
    Ok(claims)
}

/// Issue a session token for `user`.
pub fn generate_jwt_token(config: &AuthConfig, user: &User) -> ApiResult<String> {
    let claims = Claims::for_user(user, config.jwt_expiration_secs, &*config.clock);
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

// ============================================================================
// PASSWORDS
// ============================================================================

/// Hash a password with argon2id into a PHC string.
pub fn hash_password(password: &str) -> ApiResult<String> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Check `password` against a stored argon2 PHC hash.
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Burn one verification against a fixed hash.
///
/// Used when no account matches a login email, so the miss costs the same
/// as a wrong password.
pub fn verify_password_for_missing_account(password: &str) {
    static DUMMY_HASH: once_cell::sync::Lazy<Option<String>> =
        once_cell::sync::Lazy::new(|| hash_password("helperbase-missing-account").ok());

    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

// ============================================================================
// COOKIES AND HEADERS
// ============================================================================

/// `Set-Cookie` value carrying a new session token.
pub fn session_cookie(config: &AuthConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_cookie_name, token, config.jwt_expiration_secs
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(config: &AuthConfig) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.session_cookie_name
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Find the value of cookie `name` in a `Cookie` header.
pub fn token_from_cookie_header<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then_some(value)
    })
}

/// Strip the `Bearer ` prefix from an `Authorization` header.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
