use axum::Json;
use axum::extract::{Path, State};
use clubhouse_domain::{AccessRequirement, UserId};
use tracing::debug;

use crate::dto::{
    AccessCheckRequest, AccessCheckResponse, PermissionCheckRequest, PermissionDebugResponse,
    PermissionRecordResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PermissionRecordResponse>> {
    let user_id = UserId::new(user_id)?;
    let record = state.permission_resolver.resolve(Some(&user_id)).await;

    Ok(Json(PermissionRecordResponse::new(&user_id, &record)))
}

pub async fn access_check_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<AccessCheckRequest>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let user_id = UserId::new(user_id)?;
    let requirement = AccessRequirement::try_from(payload)?;
    let record = state.permission_resolver.resolve(Some(&user_id)).await;
    let granted = requirement.is_satisfied_by(&record);

    debug!(user_id = %user_id, ?requirement, granted, "evaluated access check");

    Ok(Json(AccessCheckResponse { granted }))
}

pub async fn remote_permission_check_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<PermissionCheckRequest>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let user_id = UserId::new(user_id)?;
    let granted = state
        .permission_resolver
        .check_permission_remote(Some(&user_id), payload.permission_name.as_str())
        .await;

    Ok(Json(AccessCheckResponse { granted }))
}

pub async fn permission_debug_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PermissionDebugResponse>> {
    let user_id = UserId::new(user_id)?;
    let snapshot = state.permission_resolver.describe(Some(&user_id)).await;

    Ok(Json(PermissionDebugResponse::new(&user_id, &snapshot)))
}
