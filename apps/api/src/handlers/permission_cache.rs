use axum::extract::{Path, State};
use axum::http::StatusCode;
use clubhouse_domain::UserId;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn invalidate_user_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::new(user_id)?;
    state.permission_resolver.invalidate(Some(&user_id)).await;

    info!(user_id = %user_id, "invalidated cached permissions");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_permission_cache_handler(State(state): State<AppState>) -> StatusCode {
    state.permission_resolver.invalidate(None).await;

    info!("cleared permission cache");
    StatusCode::NO_CONTENT
}
