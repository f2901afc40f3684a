//! Record types for the three sheets: helpers, incidents and users.

use crate::{HelperId, HelperStatus, IncidentId, IncidentSeverity, IncidentStatus, Role, Timestamp, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A domestic-helper employment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Helper {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub helper_id: HelperId,
    pub full_name: String,
    pub nationality: String,
    pub passport_number: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub employer_name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub employment_start: Option<NaiveDate>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub employment_end: Option<NaiveDate>,
    pub status: HelperStatus,
    pub notes: Option<String>,
    /// Opaque media URL; upload is handled outside this service.
    pub photo_url: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Helper {
    pub fn is_active(&self) -> bool {
        self.status == HelperStatus::Active
    }
}

/// An incident report filed against a helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Incident {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub incident_id: IncidentId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub helper_id: HelperId,
    pub title: String,
    pub description: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub incident_date: NaiveDate,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    /// Email of the account that filed the report.
    pub reported_by: String,
    pub resolution: Option<String>,
    /// Media URLs attached to the report.
    #[serde(default)]
    pub attachments: Vec<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// A system account.
///
/// Holds the password hash and is never returned from a handler; use
/// [`UserProfile`] for anything leaving the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    #[serde(deserialize_with = "Role::deserialize_lenient")]
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_login_at: Option<Timestamp>,
}

impl User {
    /// Public view of this account.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }

    /// Whether `email` names this account (case-insensitive).
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// A user record without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub last_login_at: Option<Timestamp>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Canonical stored form of an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        let now = Utc::now();
        User {
            user_id: UserId::now_v7(),
            email: "ops@example.com".to_string(),
            name: "Ops".to_string(),
            role: Role::Staff,
            password_hash: "salt$digest".to_string(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn test_user_serialization_omits_password_hash() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(user())?;
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "staff");
        Ok(())
    }

    fn stored_row(role: &str) -> serde_json::Value {
        serde_json::json!({
            "user_id": "0191d6f4-7d3c-7c4e-9a5b-3f2e1d0c9b8a",
            "email": "ops@example.com",
            "name": "Ops",
            "role": role,
            "password_hash": "$argon2id$stored",
            "created_at": "2024-05-01T08:00:00Z",
            "updated_at": "2024-05-01T08:00:00Z",
            "last_login_at": null
        })
    }

    #[test]
    fn test_stored_role_is_read_leniently() -> Result<(), serde_json::Error> {
        let admin: User = serde_json::from_value(stored_row("ADMIN"))?;
        assert_eq!(admin.role, Role::Admin);

        let unknown: User = serde_json::from_value(stored_row("superuser"))?;
        assert_eq!(unknown.role, Role::Viewer);

        let blank: User = serde_json::from_value(stored_row(""))?;
        assert_eq!(blank.role, Role::Viewer);
        Ok(())
    }

    #[test]
    fn test_email_match_ignores_case() {
        let user = user();
        assert!(user.has_email("OPS@Example.com"));
        assert!(user.has_email(" ops@example.com "));
        assert!(!user.has_email("other@example.com"));
    }

    #[test]
    fn test_profile_copies_public_fields() {
        let user = user();
        let profile = user.profile();
        assert_eq!(profile.user_id, user.user_id);
        assert_eq!(profile.email, user.email);
        assert_eq!(profile.role, user.role);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }
}
