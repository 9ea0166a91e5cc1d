use std::sync::Arc;

use clubhouse_application::PermissionResolver;
use clubhouse_core::AppError;
use clubhouse_infrastructure::InMemoryPermissionCache;

use super::permission_source::build_permission_source;
use crate::api_config::ApiConfig;
use crate::state::AppState;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let permission_source =
        build_permission_source(&config.permission_source, config.permission_fetch_timeout)
            .await?;
    let permission_cache = Arc::new(InMemoryPermissionCache::new(config.permission_cache_ttl));

    let permission_resolver = PermissionResolver::new(permission_source, permission_cache)
        .with_fetch_timeout(config.permission_fetch_timeout);

    Ok(AppState {
        permission_resolver,
        internal_shared_secret: Arc::from(config.internal_shared_secret.as_str()),
    })
}
