//! Access control policy
//!
//! Pure mapping from [`Role`] to the actions it may perform. Every function
//! here is total over all roles and never fails; a denial is `false`.

use crate::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every role may read.
pub fn can_view(_role: Role) -> bool {
    true
}

pub fn can_create(role: Role) -> bool {
    matches!(role, Role::Staff | Role::Admin)
}

pub fn can_edit(role: Role) -> bool {
    matches!(role, Role::Staff | Role::Admin)
}

/// Same rule as create and edit.
pub fn can_delete(role: Role) -> bool {
    matches!(role, Role::Staff | Role::Admin)
}

pub fn can_manage_users(role: Role) -> bool {
    role == Role::Admin
}

/// Whether `role` ranks at or above `required`.
pub fn has_permission(role: Role, required: Role) -> bool {
    role.priority() >= required.priority()
}

/// Whether `role` appears in an explicit allow-list.
pub fn has_any_role(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

/// A gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    ManageUsers,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::ManageUsers,
    ];

    /// Lowest role allowed to perform this action.
    pub const fn minimum_role(self) -> Role {
        match self {
            Action::View => Role::Viewer,
            Action::Create | Action::Edit | Action::Delete => Role::Staff,
            Action::ManageUsers => Role::Admin,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::ManageUsers => "manage users",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check `action` for `role` through the named predicates.
pub fn is_allowed(role: Role, action: Action) -> bool {
    match action {
        Action::View => can_view(role),
        Action::Create => can_create(role),
        Action::Edit => can_edit(role),
        Action::Delete => can_delete(role),
        Action::ManageUsers => can_manage_users(role),
    }
}

/// Snapshot of what a role may do, for clients that gate their own UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Permissions {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_users: bool,
}

impl Permissions {
    pub fn for_role(role: Role) -> Self {
        Self {
            can_view: can_view(role),
            can_create: can_create(role),
            can_edit: can_edit(role),
            can_delete: can_delete(role),
            can_manage_users: can_manage_users(role),
        }
    }
}
