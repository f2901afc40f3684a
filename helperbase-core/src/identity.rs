//! Identity types for Helperbase records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Define a strongly-typed record identifier backed by a UUIDv7.
///
/// Each sheet gets its own id type so a helper id can never be passed
/// where an incident id is expected.
macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh, timestamp-sortable identifier.
            pub fn now_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// The nil identifier.
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Get the underlying UUID.
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a helper (employee) record.
    HelperId
);

define_entity_id!(
    /// Identifier of an incident report.
    IncidentId
);

define_entity_id!(
    /// Identifier of a system account.
    UserId
);
