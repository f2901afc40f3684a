//! Bootstrap admin account
//!
//! A fresh deployment has no users and so no one who can create them.
//! `HELPERBASE_BOOTSTRAP_ADMIN_*` names an admin to seed at startup.

use chrono::Utc;
use helperbase_core::{normalize_email, Role, User, UserId};

use crate::auth::hash_password;
use crate::cached_store::CachedStore;
use crate::error::ApiResult;
use crate::types::CreateUserRequest;

/// Admin account to create when no user has its email.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BootstrapAdmin {
    /// Read the bootstrap admin from the environment.
    ///
    /// - `HELPERBASE_BOOTSTRAP_ADMIN_EMAIL`
    /// - `HELPERBASE_BOOTSTRAP_ADMIN_PASSWORD`
    /// - `HELPERBASE_BOOTSTRAP_ADMIN_NAME` (default: Administrator)
    ///
    /// Returns `None` unless both email and password are set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("HELPERBASE_BOOTSTRAP_ADMIN_EMAIL").ok()?;
        let password = std::env::var("HELPERBASE_BOOTSTRAP_ADMIN_PASSWORD").ok()?;
        let name = std::env::var("HELPERBASE_BOOTSTRAP_ADMIN_NAME")
            .unwrap_or_else(|_| "Administrator".to_string());
        Some(Self {
            email,
            name,
            password,
        })
    }

    /// Create the admin unless a user with this email already exists.
    ///
    /// Returns whether a user was created.
    pub async fn seed(&self, store: &CachedStore) -> ApiResult<bool> {
        CreateUserRequest {
            email: self.email.clone(),
            name: self.name.clone(),
            role: Role::Admin,
            password: self.password.clone(),
        }
        .validate()?;

        let email = normalize_email(&self.email);
        if store.user_find_by_email(&email).await?.is_some() {
            tracing::debug!(email = %email, "Bootstrap admin already exists");
            return Ok(false);
        }

        let now = Utc::now();
        let user = User {
            user_id: UserId::now_v7(),
            email,
            name: self.name.trim().to_string(),
            role: Role::Admin,
            password_hash: hash_password(&self.password)?,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        store.user_create(&user).await?;

        tracing::info!(user_id = %user.user_id, email = %user.email, "Bootstrap admin created");
        Ok(true)
    }
}
