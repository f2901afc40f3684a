//! Helperbase Core - Domain Types
//!
//! Records, roles, the access policy and form progression. Every other
//! crate depends on this one. No I/O happens here.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod policy;
pub mod wizard;

pub use entities::{normalize_email, Helper, Incident, User, UserProfile};
pub use enums::{EntityType, EnumParseError, HelperStatus, IncidentSeverity, IncidentStatus, Role};
pub use error::{
    ConfigError, HelperbaseError, HelperbaseResult, PolicyError, StorageError, ValidationError,
};
pub use identity::{HelperId, IncidentId, Timestamp, UserId};
pub use metrics::{DashboardMetrics, RECENT_INCIDENT_LIMIT};
pub use policy::{
    can_create, can_delete, can_edit, can_manage_users, can_view, has_any_role, has_permission,
    is_allowed, Action, Permissions,
};
pub use wizard::StepProgress;
