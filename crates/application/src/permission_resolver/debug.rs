use std::time::Duration;

use clubhouse_domain::{LegacyRoleFlags, PermissionRecord, UserId};
use tracing::debug;

use super::PermissionResolver;

/// Point-in-time view of what the resolver knows about one principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDebugSnapshot {
    /// Principal the snapshot was taken for.
    pub user_id: Option<UserId>,
    /// Resolved record contents.
    pub record: PermissionRecord,
    /// Legacy projections evaluated against `record`.
    pub legacy_roles: LegacyRoleFlags,
    /// Whether the record was served without a remote fetch.
    pub served_from_cache: bool,
    /// Time left before the cached entry expires.
    pub remaining_ttl: Option<Duration>,
}

impl PermissionResolver {
    /// Resolves a principal and reports the result alongside cache state.
    pub async fn describe(&self, user_id: Option<&UserId>) -> PermissionDebugSnapshot {
        let served_from_cache = match user_id {
            Some(user_id) => matches!(self.cache.remaining_ttl(user_id).await, Ok(Some(_))),
            None => false,
        };

        let record = self.resolve(user_id).await;

        let remaining_ttl = match user_id {
            Some(user_id) => self.cache.remaining_ttl(user_id).await.ok().flatten(),
            None => None,
        };

        let snapshot = PermissionDebugSnapshot {
            user_id: user_id.cloned(),
            legacy_roles: record.legacy_roles(),
            record: record.as_ref().clone(),
            served_from_cache,
            remaining_ttl,
        };

        debug!(
            user_id = ?snapshot.user_id,
            permissions = ?snapshot.record.permissions(),
            accessible_teams = ?snapshot.record.accessible_teams(),
            roles = ?snapshot.record.roles(),
            legacy_roles = ?snapshot.legacy_roles,
            served_from_cache,
            remaining_ttl_ms = remaining_ttl.map(super::facets::millis),
            "permission debug snapshot"
        );

        snapshot
    }
}
