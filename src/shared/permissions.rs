/**
 * Project Roles and Permissions
 *
 * Every project member holds exactly one role. Roles map onto a fixed
 * permission matrix; nothing is configurable per project.
 *
 * | role      | view | comment | edit | delete | members | project |
 * |-----------|------|---------|------|--------|---------|---------|
 * | owner     |  x   |    x    |  x   |   x    |    x    |    x    |
 * | admin     |  x   |    x    |  x   |   x    |    x    |         |
 * | editor    |  x   |    x    |  x   |        |         |         |
 * | commenter |  x   |    x    |      |        |         |         |
 * | viewer    |  x   |         |      |        |         |         |
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// Role of a project member
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Commenter,
    #[default]
    Viewer,
}

/// A single capability checked by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    View,
    Comment,
    Edit,
    Delete,
    ManageMembers,
    ManageProject,
}

/// Expanded permission set of a role, as returned to clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissions {
    pub can_view: bool,
    pub can_comment: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_members: bool,
    pub can_manage_project: bool,
}

impl Role {
    /// All roles, highest first
    pub const ALL: [Role; 5] = [
        Role::Owner,
        Role::Admin,
        Role::Editor,
        Role::Commenter,
        Role::Viewer,
    ];

    /// Permission matrix row for this role
    pub fn permissions(self) -> RolePermissions {
        match self {
            Role::Owner => RolePermissions {
                can_view: true,
                can_comment: true,
                can_edit: true,
                can_delete: true,
                can_manage_members: true,
                can_manage_project: true,
            },
            Role::Admin => RolePermissions {
                can_view: true,
                can_comment: true,
                can_edit: true,
                can_delete: true,
                can_manage_members: true,
                can_manage_project: false,
            },
            Role::Editor => RolePermissions {
                can_view: true,
                can_comment: true,
                can_edit: true,
                can_delete: false,
                can_manage_members: false,
                can_manage_project: false,
            },
            Role::Commenter => RolePermissions {
                can_view: true,
                can_comment: true,
                can_edit: false,
                can_delete: false,
                can_manage_members: false,
                can_manage_project: false,
            },
            Role::Viewer => RolePermissions {
                can_view: true,
                can_comment: false,
                can_edit: false,
                can_delete: false,
                can_manage_members: false,
                can_manage_project: false,
            },
        }
    }

    /// Whether this role grants `permission`
    pub fn can(self, permission: Permission) -> bool {
        self.permissions().allows(permission)
    }

    /// Roles that may be handed out through the members API.
    ///
    /// Ownership only changes hands through an explicit transfer.
    pub fn is_assignable(self) -> bool {
        self != Role::Owner
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Commenter => "commenter",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "commenter" => Ok(Role::Commenter),
            "viewer" => Ok(Role::Viewer),
            _ => Err(SharedError::validation("role", "Invalid role")),
        }
    }
}

impl RolePermissions {
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::View => self.can_view,
            Permission::Comment => self.can_comment,
            Permission::Edit => self.can_edit,
            Permission::Delete => self.can_delete,
            Permission::ManageMembers => self.can_manage_members,
            Permission::ManageProject => self.can_manage_project,
        }
    }
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::View,
        Permission::Comment,
        Permission::Edit,
        Permission::Delete,
        Permission::ManageMembers,
        Permission::ManageProject,
    ];

    /// Wire name used in error bodies (`canEdit`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::View => "canView",
            Permission::Comment => "canComment",
            Permission::Edit => "canEdit",
            Permission::Delete => "canDelete",
            Permission::ManageMembers => "canManageMembers",
            Permission::ManageProject => "canManageProject",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
