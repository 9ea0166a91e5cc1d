use clubhouse_domain::{PermissionName, TeamId, UserId};
use serde::Deserialize;
use sqlx::FromRow;
use tracing::warn;

#[derive(Debug, Deserialize, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) permission_name: String,
}

#[derive(Debug, Deserialize, FromRow)]
pub(crate) struct TeamRow {
    pub(crate) team_id: String,
}

#[derive(Debug, Deserialize, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) role: String,
}

/// Malformed rows are logged and skipped so one bad row never empties the facet.
pub(crate) fn decode_permissions(
    user_id: &UserId,
    rows: Vec<PermissionRow>,
) -> Vec<PermissionName> {
    rows.into_iter()
        .filter_map(|row| match PermissionName::new(row.permission_name) {
            Ok(permission) => Some(permission),
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "skipping malformed permission row"
                );
                None
            }
        })
        .collect()
}

pub(crate) fn decode_teams(user_id: &UserId, rows: Vec<TeamRow>) -> Vec<TeamId> {
    rows.into_iter()
        .filter_map(|row| match TeamId::new(row.team_id) {
            Ok(team_id) => Some(team_id),
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "skipping malformed accessible team row"
                );
                None
            }
        })
        .collect()
}

pub(crate) fn decode_roles(rows: Vec<RoleRow>) -> Vec<String> {
    rows.into_iter().map(|row| row.role).collect()
}
