use std::sync::Arc;
use std::time::Duration;

use clubhouse_application::PermissionSource;
use clubhouse_core::AppError;
use clubhouse_infrastructure::{HttpPermissionSource, PostgresPermissionSource};
use tracing::info;

use super::database;
use crate::api_config::PermissionSourceConfig;

pub(super) async fn build_permission_source(
    config: &PermissionSourceConfig,
    fetch_timeout: Duration,
) -> Result<Arc<dyn PermissionSource>, AppError> {
    match config {
        PermissionSourceConfig::Http {
            backend_url,
            api_key,
        } => {
            let http_client = reqwest::Client::builder()
                .timeout(fetch_timeout)
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build HTTP client: {error}"))
                })?;
            let source =
                HttpPermissionSource::new(http_client, backend_url.as_str(), api_key.as_str())?;

            info!(backend_url = %backend_url, "using http permission source");
            Ok(Arc::new(source))
        }
        PermissionSourceConfig::Postgres { database_url } => {
            let pool = database::connect(database_url.as_str()).await?;

            info!("using postgres permission source");
            Ok(Arc::new(PostgresPermissionSource::new(pool)))
        }
    }
}
