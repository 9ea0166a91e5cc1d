use std::str::FromStr;

use clubhouse_application::PermissionDebugSnapshot;
use clubhouse_core::{AppError, AppResult};
use clubhouse_domain::{
    AccessRequirement, LegacyRoleFlags, PermissionName, PermissionRecord, Role, TeamId, UserId,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Derived legacy role booleans.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/legacy-roles-response.ts"
)]
pub struct LegacyRolesResponse {
    pub is_admin: bool,
    pub is_manager: bool,
    pub is_coach: bool,
    pub is_parent: bool,
}

impl From<LegacyRoleFlags> for LegacyRolesResponse {
    fn from(value: LegacyRoleFlags) -> Self {
        Self {
            is_admin: value.is_admin,
            is_manager: value.is_manager,
            is_coach: value.is_coach,
            is_parent: value.is_parent,
        }
    }
}

/// Resolved permissions of one user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-record-response.ts"
)]
pub struct PermissionRecordResponse {
    pub user_id: String,
    pub permissions: Vec<String>,
    pub accessible_teams: Vec<String>,
    pub roles: Vec<String>,
    pub legacy_roles: LegacyRolesResponse,
}

impl PermissionRecordResponse {
    pub fn new(user_id: &UserId, record: &PermissionRecord) -> Self {
        Self {
            user_id: user_id.to_string(),
            permissions: record
                .permissions()
                .iter()
                .map(|name| name.as_str().to_owned())
                .collect(),
            accessible_teams: record
                .accessible_teams()
                .iter()
                .map(|team_id| team_id.as_str().to_owned())
                .collect(),
            roles: record
                .roles()
                .iter()
                .map(|role| role.as_str().to_owned())
                .collect(),
            legacy_roles: record.legacy_roles().into(),
        }
    }
}

/// Requirement evaluated by an access check.
#[derive(Debug, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-check-request.ts"
)]
pub enum AccessCheckRequest {
    Permission {
        permission: String,
        #[serde(default)]
        team_id: Option<String>,
    },
    Permissions {
        permissions: Vec<String>,
        #[serde(default)]
        require_all: bool,
    },
    Roles {
        roles: Vec<String>,
        #[serde(default)]
        require_all: bool,
    },
}

impl TryFrom<AccessCheckRequest> for AccessRequirement {
    type Error = AppError;

    fn try_from(value: AccessCheckRequest) -> AppResult<Self> {
        match value {
            AccessCheckRequest::Permission {
                permission,
                team_id,
            } => Ok(Self::Permission {
                permission: PermissionName::new(permission)?,
                team_id: team_id.map(TeamId::new).transpose()?,
            }),
            AccessCheckRequest::Permissions {
                permissions,
                require_all,
            } => Ok(Self::Permissions {
                permissions: permissions
                    .into_iter()
                    .map(PermissionName::new)
                    .collect::<AppResult<_>>()?,
                require_all,
            }),
            AccessCheckRequest::Roles { roles, require_all } => Ok(Self::Roles {
                roles: roles
                    .iter()
                    .map(|role| Role::from_str(role))
                    .collect::<AppResult<_>>()?,
                require_all,
            }),
        }
    }
}

/// Single permission checked server-side.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-request.ts"
)]
pub struct PermissionCheckRequest {
    pub permission_name: String,
}

/// Outcome of an access or permission check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-check-response.ts"
)]
pub struct AccessCheckResponse {
    pub granted: bool,
}

/// Diagnostic view of one user's cached permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-debug-response.ts"
)]
pub struct PermissionDebugResponse {
    pub record: PermissionRecordResponse,
    pub served_from_cache: bool,
    #[ts(type = "number | null")]
    pub remaining_ttl_ms: Option<u64>,
    /// RFC 3339 wall-clock estimate of the cache entry expiry.
    pub expires_at: Option<String>,
}

impl PermissionDebugResponse {
    pub fn new(user_id: &UserId, snapshot: &PermissionDebugSnapshot) -> Self {
        let remaining_ttl = snapshot.remaining_ttl;
        Self {
            record: PermissionRecordResponse::new(user_id, &snapshot.record),
            served_from_cache: snapshot.served_from_cache,
            remaining_ttl_ms: remaining_ttl
                .map(|ttl| u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
            expires_at: remaining_ttl
                .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
                .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
                .map(|expires_at| expires_at.to_rfc3339()),
        }
    }
}
