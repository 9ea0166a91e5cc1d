use clubhouse_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub(super) async fn connect(database_url: &str) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}
