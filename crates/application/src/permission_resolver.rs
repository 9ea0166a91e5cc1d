use std::sync::Arc;
use std::time::Duration;

use clubhouse_domain::{PermissionRecord, UserId};
use tracing::{debug, warn};

use crate::{PermissionCache, PermissionSource};

mod debug;
mod facets;


pub use debug::PermissionDebugSnapshot;

/// Default upper bound for one facet fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Application service resolving permission records through a TTL cache.
///
/// Resolution never fails: every remote or cache error degrades to missing
/// permissions. Concurrent misses for one user are not deduplicated; the last
/// completed fetch wins the cache slot.
#[derive(Clone)]
pub struct PermissionResolver {
    source: Arc<dyn PermissionSource>,
    cache: Arc<dyn PermissionCache>,
    fetch_timeout: Duration,
}

impl PermissionResolver {
    /// Creates a resolver over a remote source and an injected cache.
    #[must_use]
    pub fn new(source: Arc<dyn PermissionSource>, cache: Arc<dyn PermissionCache>) -> Self {
        Self {
            source,
            cache,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Overrides the per-facet fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Returns the record for a principal, fetching on cache miss or expiry.
    ///
    /// `None` stands for a principal whose authentication has not settled and
    /// yields the empty record without touching the cache or the backend.
    pub async fn resolve(&self, user_id: Option<&UserId>) -> Arc<PermissionRecord> {
        let Some(user_id) = user_id else {
            return Arc::new(PermissionRecord::empty());
        };

        match self.cache.get(user_id).await {
            Ok(Some(record)) => {
                debug!(user_id = %user_id, "permission cache hit");
                return record;
            }
            Ok(None) => debug!(user_id = %user_id, "permission cache miss"),
            Err(error) => warn!(
                user_id = %user_id,
                error = %error,
                "permission cache read failed; fetching from source"
            ),
        }

        let record = Arc::new(
            facets::fetch_record(self.source.as_ref(), user_id, self.fetch_timeout).await,
        );

        if let Err(error) = self.cache.put(user_id, record.clone()).await {
            warn!(
                user_id = %user_id,
                error = %error,
                "failed to store resolved permissions"
            );
        }

        record
    }

    /// Drops one principal's cached record, or every record when `None`.
    ///
    /// Called on logout and after role or grant changes made elsewhere.
    pub async fn invalidate(&self, user_id: Option<&UserId>) {
        let result = match user_id {
            Some(user_id) => self.cache.evict(user_id).await,
            None => self.cache.clear().await,
        };

        match (result, user_id) {
            (Ok(()), Some(user_id)) => {
                debug!(user_id = %user_id, "permission cache entry invalidated");
            }
            (Ok(()), None) => debug!("permission cache cleared"),
            (Err(error), _) => warn!(error = %error, "permission cache invalidation failed"),
        }
    }

    /// Asks the backend directly whether the principal holds one permission.
    ///
    /// Bypasses the cache entirely. Errors and unauthenticated principals
    /// evaluate to `false`.
    pub async fn check_permission_remote(
        &self,
        user_id: Option<&UserId>,
        permission: &str,
    ) -> bool {
        let Some(user_id) = user_id else {
            return false;
        };

        let check = tokio::time::timeout(
            self.fetch_timeout,
            self.source.has_permission(user_id, permission),
        )
        .await;

        match check {
            Ok(Ok(granted)) => granted,
            Ok(Err(error)) => {
                warn!(
                    user_id = %user_id,
                    permission,
                    error = %error,
                    "remote permission check failed"
                );
                false
            }
            Err(_) => {
                warn!(
                    user_id = %user_id,
                    permission,
                    timeout_ms = facets::millis(self.fetch_timeout),
                    "remote permission check timed out"
                );
                false
            }
        }
    }
}
