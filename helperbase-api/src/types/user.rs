//! User-related API types

use helperbase_core::{normalize_email, Role, UserProfile};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::validation::{HasUpdates, ValidateNonEmpty};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Request to create a system user.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl CreateUserRequest {
    pub fn validate(&self) -> ApiResult<()> {
        validate_email(&self.email)?;
        self.name.validate_non_empty("name")?;
        validate_password(&self.password)
    }
}

/// Request to update a user. Absent fields are left unchanged.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    /// New password
    pub password: Option<String>,
}

impl std::fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HasUpdates for UpdateUserRequest {
    fn has_any_updates(&self) -> bool {
        self.email.is_some() || self.name.is_some() || self.role.is_some() || self.password.is_some()
    }
}

impl UpdateUserRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.validate_has_updates()?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(name) = &self.name {
            name.validate_non_empty("name")?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

/// Minimal shape check: one `@` with text on both sides and a dot in the
/// domain.
pub fn validate_email(email: &str) -> ApiResult<()> {
    email.validate_non_empty("email")?;
    let email = normalize_email(email);
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && !domain.contains('@') && domain.contains('.')
        });
    if !valid {
        return Err(ApiError::invalid_format("email", "name@domain"));
    }
    Ok(())
}

fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation_failed(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Response containing a list of users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListUsersResponse {
    pub users: Vec<UserProfile>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(validate_email("a@b.org").is_ok());
        assert!(validate_email(" A@B.ORG ").is_ok());
        assert!(validate_email("ab.org").is_err());
        assert!(validate_email("@b.org").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a@b@c.org").is_err());
    }

    #[test]
    fn test_short_password_rejected() {
        let req = CreateUserRequest {
            email: "a@b.org".to_string(),
            name: "A".to_string(),
            role: Role::Viewer,
            password: "short".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let req = UpdateUserRequest {
            password: Some("hunter2hunter2".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", req);
        assert!(!rendered.contains("hunter2"));
        assert!(req.validate().is_ok());
    }
}
