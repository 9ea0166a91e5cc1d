use std::sync::Arc;

use clubhouse_application::PermissionResolver;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_resolver: PermissionResolver,
    pub internal_shared_secret: Arc<str>,
}
