use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clubhouse_application::PermissionCache;
use clubhouse_core::AppResult;
use clubhouse_domain::{PermissionRecord, UserId};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Default lifetime of a cached permission record.
pub const DEFAULT_PERMISSION_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct PermissionCacheEntry {
    record: Arc<PermissionRecord>,
    resolved_at: Instant,
    expires_at: Instant,
}

impl PermissionCacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory TTL cache adapter for resolved permission records.
///
/// Expired entries are dropped lazily on the next read of their key.
pub struct InMemoryPermissionCache {
    ttl: Duration,
    entries: RwLock<HashMap<UserId, PermissionCacheEntry>>,
}

impl Default for InMemoryPermissionCache {
    fn default() -> Self {
        Self::new(DEFAULT_PERMISSION_CACHE_TTL)
    }
}

impl InMemoryPermissionCache {
    /// Creates an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the configured entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns whether no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, user_id: &UserId) -> AppResult<Option<Arc<PermissionRecord>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                Some(entry) if entry.is_live(Instant::now()) => {
                    return Ok(Some(entry.record.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let expired = entries.get(user_id).is_some_and(|entry| !entry.is_live(now));
        if let Some(expired) = expired.then(|| entries.remove(user_id)).flatten() {
            debug!(
                user_id = %user_id,
                age_secs = now.saturating_duration_since(expired.resolved_at).as_secs(),
                "evicted expired permission cache entry"
            );
        }

        Ok(None)
    }

    async fn put(&self, user_id: &UserId, record: Arc<PermissionRecord>) -> AppResult<()> {
        let resolved_at = Instant::now();
        let expires_at = resolved_at.checked_add(self.ttl).unwrap_or(resolved_at);

        self.entries.write().await.insert(
            user_id.clone(),
            PermissionCacheEntry {
                record,
                resolved_at,
                expires_at,
            },
        );

        Ok(())
    }

    async fn evict(&self, user_id: &UserId) -> AppResult<()> {
        self.entries.write().await.remove(user_id);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn remaining_ttl(&self, user_id: &UserId) -> AppResult<Option<Duration>> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(user_id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at.saturating_duration_since(now)))
    }
}
