//! Enum types for Helperbase records

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}: {value}")]
pub struct EnumParseError {
    /// Which enum was being parsed ("role", "helper status", ...).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl EnumParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// ROLE
// ============================================================================

/// Role assigned to a system account.
///
/// Roles are totally ordered by privilege: `Viewer < Staff < Admin`. The
/// ordering comes from [`Role::priority`], an explicit lookup table, and
/// never from declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access
    #[default]
    Viewer,
    /// Can create, edit and delete helpers and incidents
    Staff,
    /// Staff rights plus user management
    Admin,
}

impl Role {
    /// Every role, lowest privilege first.
    pub const ALL: [Role; 3] = [Role::Viewer, Role::Staff, Role::Admin];

    /// Privilege rank used for `has_permission` comparisons.
    pub const fn priority(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Staff => 1,
            Role::Admin => 2,
        }
    }

    /// Stored string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Parse a role, falling back to `Viewer` for anything unrecognised.
    ///
    /// Used when reading rows written outside this service, where an unknown
    /// value must never grant more than read access.
    pub fn parse_or_least_privilege(s: &str) -> Self {
        s.parse().unwrap_or(Role::Viewer)
    }

    /// Serde adapter over [`Role::parse_or_least_privilege`] for stored rows.
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse_or_least_privilege(&raw))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(EnumParseError::new("role", s)),
        }
    }
}

// ============================================================================
// HELPER STATUS
// ============================================================================

/// Employment status of a helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HelperStatus {
    /// Currently employed
    #[default]
    Active,
    /// Between placements
    Inactive,
    /// Contract ended by the employer
    Terminated,
}

impl HelperStatus {
    /// Stored string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            HelperStatus::Active => "active",
            HelperStatus::Inactive => "inactive",
            HelperStatus::Terminated => "terminated",
        }
    }
}

impl fmt::Display for HelperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HelperStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(HelperStatus::Active),
            "inactive" => Ok(HelperStatus::Inactive),
            "terminated" => Ok(HelperStatus::Terminated),
            _ => Err(EnumParseError::new("helper status", s)),
        }
    }
}

// ============================================================================
// INCIDENT ENUMS
// ============================================================================

/// Severity of an incident report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IncidentSeverity {
    /// Every severity, least severe first.
    pub const ALL: [IncidentSeverity; 4] = [
        IncidentSeverity::Low,
        IncidentSeverity::Medium,
        IncidentSeverity::High,
        IncidentSeverity::Critical,
    ];

    /// Stored string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            IncidentSeverity::Low => "low",
            IncidentSeverity::Medium => "medium",
            IncidentSeverity::High => "high",
            IncidentSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for IncidentSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentSeverity {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(IncidentSeverity::Low),
            "medium" => Ok(IncidentSeverity::Medium),
            "high" => Ok(IncidentSeverity::High),
            "critical" => Ok(IncidentSeverity::Critical),
            _ => Err(EnumParseError::new("incident severity", s)),
        }
    }
}

/// Case-handling status of an incident report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    /// Reported, not yet looked at
    #[default]
    Open,
    /// Someone is following up
    Investigating,
    /// Outcome recorded
    Resolved,
    /// No further action
    Closed,
}

impl IncidentStatus {
    /// Stored string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Closed => "closed",
        }
    }

    /// Whether the case still needs attention.
    pub const fn is_open(self) -> bool {
        matches!(self, IncidentStatus::Open | IncidentStatus::Investigating)
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(IncidentStatus::Open),
            "investigating" => Ok(IncidentStatus::Investigating),
            "resolved" => Ok(IncidentStatus::Resolved),
            "closed" => Ok(IncidentStatus::Closed),
            _ => Err(EnumParseError::new("incident status", s)),
        }
    }
}

// ============================================================================
// ENTITY TYPE
// ============================================================================

/// Sheet discriminator for error messages and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Helper,
    Incident,
    User,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Helper => "Helper",
            EntityType::Incident => "Incident",
            EntityType::User => "User",
        };
        f.write_str(name)
    }
}
