use async_trait::async_trait;
use clubhouse_application::PermissionSource;
use clubhouse_core::{AppError, AppResult};
use clubhouse_domain::{PermissionName, TeamId, UserId};
use sqlx::PgPool;

use crate::permission_rows::{
    PermissionRow, RoleRow, TeamRow, decode_permissions, decode_roles, decode_teams,
};

/// PostgreSQL-backed permission source calling the backend's permission functions.
///
/// User identifiers are cast to `uuid` in SQL.
#[derive(Clone)]
pub struct PostgresPermissionSource {
    pool: PgPool,
}

impl PostgresPermissionSource {
    /// Creates a source with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionSource for PostgresPermissionSource {
    async fn user_permissions(&self, user_id: &UserId) -> AppResult<Vec<PermissionName>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.permission_name::text AS permission_name
            FROM get_user_permissions($1::uuid) AS permissions
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Upstream(format!(
                "failed to load permissions for user '{user_id}': {error}"
            ))
        })?;

        Ok(decode_permissions(user_id, rows))
    }

    async fn accessible_teams(&self, user_id: &UserId) -> AppResult<Vec<TeamId>> {
        let rows = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT teams.team_id::text AS team_id
            FROM get_accessible_teams($1::uuid) AS teams
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Upstream(format!(
                "failed to load accessible teams for user '{user_id}': {error}"
            ))
        })?;

        Ok(decode_teams(user_id, rows))
    }

    async fn active_roles(&self, user_id: &UserId) -> AppResult<Vec<String>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT user_roles.role::text AS role
            FROM user_roles
            WHERE user_roles.user_id = $1::uuid
                AND user_roles.is_active
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Upstream(format!(
                "failed to load active roles for user '{user_id}': {error}"
            ))
        })?;

        Ok(decode_roles(rows))
    }

    async fn has_permission(&self, user_id: &UserId, permission: &str) -> AppResult<bool> {
        let granted = sqlx::query_scalar::<_, Option<bool>>(
            "SELECT has_permission($1::uuid, $2::text)",
        )
        .bind(user_id.as_str())
        .bind(permission)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Upstream(format!(
                "failed to check permission '{permission}' for user '{user_id}': {error}"
            ))
        })?;

        Ok(granted.unwrap_or(false))
    }
}
