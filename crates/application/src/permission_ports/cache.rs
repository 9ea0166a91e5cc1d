use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clubhouse_core::AppResult;
use clubhouse_domain::{PermissionRecord, UserId};

/// TTL cache port for resolved permission records keyed by user.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the live record for one user, evicting it first if it expired.
    async fn get(&self, user_id: &UserId) -> AppResult<Option<Arc<PermissionRecord>>>;

    /// Stores a record, replacing any previous entry and restarting its ttl.
    async fn put(&self, user_id: &UserId, record: Arc<PermissionRecord>) -> AppResult<()>;

    /// Removes one user's entry.
    async fn evict(&self, user_id: &UserId) -> AppResult<()>;

    /// Removes every entry.
    async fn clear(&self) -> AppResult<()>;

    /// Returns how long the user's live entry has left, if any.
    async fn remaining_ttl(&self, user_id: &UserId) -> AppResult<Option<Duration>>;
}
