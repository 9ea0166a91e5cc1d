use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use clubhouse_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    let permission_routes = Router::new()
        .route(
            "/api/users/{user_id}/permissions",
            get(handlers::permissions::get_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/permissions/debug",
            get(handlers::permissions::permission_debug_handler),
        )
        .route(
            "/api/users/{user_id}/access-checks",
            post(handlers::permissions::access_check_handler),
        )
        .route(
            "/api/users/{user_id}/permission-checks",
            post(handlers::permissions::remote_permission_check_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_internal_auth,
        ));

    let internal_routes = Router::new()
        .route(
            "/api/permission-cache",
            delete(handlers::permission_cache::clear_permission_cache_handler),
        )
        .route(
            "/api/permission-cache/{user_id}",
            delete(handlers::permission_cache::invalidate_user_permissions_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_internal_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(permission_routes)
        .merge(internal_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
