use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use clubhouse_core::AppResult;
use clubhouse_domain::{PermissionRecord, Role, UserId};
use tracing::warn;

use crate::PermissionSource;

/// One independently fetched slice of a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facet {
    Permissions,
    AccessibleTeams,
    Roles,
}

impl Facet {
    fn as_str(self) -> &'static str {
        match self {
            Self::Permissions => "permissions",
            Self::AccessibleTeams => "accessible_teams",
            Self::Roles => "roles",
        }
    }
}

/// Fetches the three facets concurrently and joins them into one record.
///
/// The record is built only after all three have settled.
pub(super) async fn fetch_record(
    source: &dyn PermissionSource,
    user_id: &UserId,
    fetch_timeout: Duration,
) -> PermissionRecord {
    let (permissions, accessible_teams, raw_roles) = tokio::join!(
        settle(
            Facet::Permissions,
            user_id,
            fetch_timeout,
            source.user_permissions(user_id),
        ),
        settle(
            Facet::AccessibleTeams,
            user_id,
            fetch_timeout,
            source.accessible_teams(user_id),
        ),
        settle(
            Facet::Roles,
            user_id,
            fetch_timeout,
            source.active_roles(user_id),
        ),
    );

    let roles = raw_roles
        .into_iter()
        .filter_map(|raw_role| match Role::from_str(raw_role.as_str()) {
            Ok(role) => Some(role),
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "skipping unrecognized role assignment"
                );
                None
            }
        });

    PermissionRecord::from_facets(permissions, accessible_teams, roles)
}

/// Awaits one facet, turning failure or timeout into an empty slot.
async fn settle<T, F>(facet: Facet, user_id: &UserId, fetch_timeout: Duration, fetch: F) -> Vec<T>
where
    F: Future<Output = AppResult<Vec<T>>>,
{
    match tokio::time::timeout(fetch_timeout, fetch).await {
        Ok(Ok(values)) => values,
        Ok(Err(error)) => {
            warn!(
                user_id = %user_id,
                facet = facet.as_str(),
                error = %error,
                "permission facet fetch failed; treating as empty"
            );
            Vec::new()
        }
        Err(_) => {
            warn!(
                user_id = %user_id,
                facet = facet.as_str(),
                timeout_ms = millis(fetch_timeout),
                "permission facet fetch timed out; treating as empty"
            );
            Vec::new()
        }
    }
}

pub(super) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
