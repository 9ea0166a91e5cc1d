use serde::{Deserialize, Serialize};

use crate::{PermissionName, PermissionRecord, Role, TeamId};

/// Declarative predicate a gate evaluates against a resolved record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessRequirement {
    /// One permission, optionally scoped to a team the principal must access.
    Permission {
        /// Required permission.
        permission: PermissionName,
        /// Team the principal must also be able to access.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team_id: Option<TeamId>,
    },
    /// Several permissions joined with AND (`require_all`) or OR.
    Permissions {
        /// Candidate permissions.
        permissions: Vec<PermissionName>,
        /// Require every permission instead of any.
        #[serde(default)]
        require_all: bool,
    },
    /// Several roles joined with AND (`require_all`) or OR.
    Roles {
        /// Candidate roles.
        roles: Vec<Role>,
        /// Require every role instead of any.
        #[serde(default)]
        require_all: bool,
    },
}

impl AccessRequirement {
    /// Requires a single permission.
    #[must_use]
    pub fn permission(permission: PermissionName) -> Self {
        Self::Permission {
            permission,
            team_id: None,
        }
    }

    /// Requires a single permission plus access to one team.
    #[must_use]
    pub fn team_permission(permission: PermissionName, team_id: TeamId) -> Self {
        Self::Permission {
            permission,
            team_id: Some(team_id),
        }
    }

    /// Requires any of the permissions.
    #[must_use]
    pub fn any_permission(permissions: impl IntoIterator<Item = PermissionName>) -> Self {
        Self::Permissions {
            permissions: permissions.into_iter().collect(),
            require_all: false,
        }
    }

    /// Requires all of the permissions.
    #[must_use]
    pub fn all_permissions(permissions: impl IntoIterator<Item = PermissionName>) -> Self {
        Self::Permissions {
            permissions: permissions.into_iter().collect(),
            require_all: true,
        }
    }

    /// Requires any of the roles.
    #[must_use]
    pub fn any_role(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::Roles {
            roles: roles.into_iter().collect(),
            require_all: false,
        }
    }

    /// Requires all of the roles.
    #[must_use]
    pub fn all_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::Roles {
            roles: roles.into_iter().collect(),
            require_all: true,
        }
    }

    /// Returns whether the record satisfies this requirement.
    #[must_use]
    pub fn is_satisfied_by(&self, record: &PermissionRecord) -> bool {
        match self {
            Self::Permission {
                permission,
                team_id,
            } => {
                record.has_permission(permission.as_str())
                    && team_id
                        .as_ref()
                        .is_none_or(|team_id| record.can_access_team(team_id.as_str()))
            }
            Self::Permissions {
                permissions,
                require_all: true,
            } => record.has_all_permissions(permissions.iter().map(PermissionName::as_str)),
            Self::Permissions {
                permissions,
                require_all: false,
            } => record.has_any_permission(permissions.iter().map(PermissionName::as_str)),
            Self::Roles {
                roles,
                require_all: true,
            } => record.has_all_roles(roles.iter().copied()),
            Self::Roles {
                roles,
                require_all: false,
            } => record.has_any_role(roles.iter().copied()),
        }
    }
}
