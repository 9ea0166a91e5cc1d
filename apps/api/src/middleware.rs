use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use clubhouse_core::AppError;
use tracing::warn;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_internal_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("internal bearer token required".to_owned()))?;

    if !constant_time_eq(token.as_bytes(), state.internal_shared_secret.as_bytes()) {
        warn!(path = %request.uri().path(), "rejected internal request with invalid token");
        return Err(AppError::Unauthorized("invalid internal bearer token".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(right)
        .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
        == 0
}
