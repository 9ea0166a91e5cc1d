use async_trait::async_trait;
use clubhouse_core::AppResult;
use clubhouse_domain::{PermissionName, TeamId, UserId};

/// Remote backend port answering permission questions for one user.
///
/// Every call must be idempotent and free of side effects.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Lists permission names currently granted to the user.
    async fn user_permissions(&self, user_id: &UserId) -> AppResult<Vec<PermissionName>>;

    /// Lists teams the user may view or manage.
    async fn accessible_teams(&self, user_id: &UserId) -> AppResult<Vec<TeamId>>;

    /// Lists raw role names of the user's currently active role assignments.
    async fn active_roles(&self, user_id: &UserId) -> AppResult<Vec<String>>;

    /// Checks one permission server-side without listing the full set.
    async fn has_permission(&self, user_id: &UserId, permission: &str) -> AppResult<bool>;
}
