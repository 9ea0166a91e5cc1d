use async_trait::async_trait;
use clubhouse_application::PermissionSource;
use clubhouse_core::{AppError, AppResult};
use clubhouse_domain::{PermissionName, TeamId, UserId};
use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::permission_rows::{
    PermissionRow, RoleRow, TeamRow, decode_permissions, decode_roles, decode_teams,
};

#[derive(Debug, Serialize)]
struct UserRequest<'a> {
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct HasPermissionRequest<'a> {
    user_id: &'a str,
    permission_name: &'a str,
}

/// REST adapter for a hosted Postgres backend exposing permission RPCs.
#[derive(Clone)]
pub struct HttpPermissionSource {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpPermissionSource {
    /// Creates a source rooted at the backend's base URL.
    ///
    /// Any path on `base_url` is kept; the REST prefix is appended to it.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> AppResult<Self> {
        let mut base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid permission backend url '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "permission backend url '{base_url}' cannot be used as a base"
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(path.as_str());
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::Validation(
                "permission backend api key must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("failed to build backend endpoint '{path}': {error}"))
        })
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", self.api_key.as_str())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn call_rpc<B, T>(&self, function: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(format!("rest/v1/rpc/{function}").as_str())?;
        let response = self
            .authorized(self.http_client.post(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!("failed to call backend rpc '{function}': {error}"))
            })?;

        read_json(response, function).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, call: &str) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());
        return Err(AppError::Upstream(format!(
            "backend call '{call}' returned status {}: {body}",
            status.as_u16()
        )));
    }

    response.json::<T>().await.map_err(|error| {
        AppError::Upstream(format!(
            "failed to parse backend call '{call}' response body: {error}"
        ))
    })
}

#[async_trait]
impl PermissionSource for HttpPermissionSource {
    async fn user_permissions(&self, user_id: &UserId) -> AppResult<Vec<PermissionName>> {
        let rows: Vec<PermissionRow> = self
            .call_rpc(
                "get_user_permissions",
                &UserRequest {
                    user_id: user_id.as_str(),
                },
            )
            .await?;

        Ok(decode_permissions(user_id, rows))
    }

    async fn accessible_teams(&self, user_id: &UserId) -> AppResult<Vec<TeamId>> {
        let rows: Vec<TeamRow> = self
            .call_rpc(
                "get_accessible_teams",
                &UserRequest {
                    user_id: user_id.as_str(),
                },
            )
            .await?;

        Ok(decode_teams(user_id, rows))
    }

    async fn active_roles(&self, user_id: &UserId) -> AppResult<Vec<String>> {
        let mut endpoint = self.endpoint("rest/v1/user_roles")?;
        endpoint
            .query_pairs_mut()
            .append_pair("select", "role")
            .append_pair("user_id", format!("eq.{user_id}").as_str())
            .append_pair("is_active", "eq.true");

        let response = self
            .authorized(self.http_client.get(endpoint))
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!("failed to query backend user_roles: {error}"))
            })?;
        let rows: Vec<RoleRow> = read_json(response, "user_roles").await?;

        Ok(decode_roles(rows))
    }

    async fn has_permission(&self, user_id: &UserId, permission: &str) -> AppResult<bool> {
        self.call_rpc(
            "has_permission",
            &HasPermissionRequest {
                user_id: user_id.as_str(),
                permission_name: permission,
            },
        )
        .await
    }
}
