//! HTTP client for the update service admin API.
//!
//! Every request carries the project identifier header once a project is
//! configured. Non-success responses surface the method, URL, status, and
//! body; HTTP 400 bodies are decoded into field-level validation errors.

pub mod types;

use std::time::Duration;

use log::debug;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{ApiError, CliError, Result};
use types::{
    CreateProjectRequest, PrepareUpdateRequest, PrepareUpdateResponse, Project, Update,
    UpdateProtocol, ValidationErrorResponse,
};

/// Header carrying the project identifier
pub const PROJECT_ID_HEADER: &str = "Airlift-Project-ID";

/// Timeout applied to the pre-publish health check
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Client for the update service admin API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    project_id: Option<String>,
}

impl ApiClient {
    /// Create a client bound to the configured project
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.api_base_url, Some(config.project_id.clone()))
    }

    /// Create a client before a project exists (used by `init`)
    pub fn with_base_url(base_url: &str, project_id: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
        }
    }

    /// Probe the server with a short timeout.
    ///
    /// Any failure (connection, timeout, non-success status) maps to a single
    /// "failed to connect" error so the publish pipeline can bail out early.
    pub async fn health_check(&self) -> Result<()> {
        let url = self.url("/api/v1/health");
        debug!("calling GET {}", url);

        let mut request = self.http.get(&url).timeout(HEALTH_CHECK_TIMEOUT);
        if let Some(project_id) = &self.project_id {
            request = request.header(PROJECT_ID_HEADER, project_id);
        }

        let response = request.send().await.map_err(|e| ApiError::Unreachable {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(ApiError::Unreachable {
                url: self.base_url.clone(),
                reason: format!("health check returned status {}", response.status()),
            }
            .into());
        }

        Ok(())
    }

    /// Register a new update and receive its upload destinations
    pub async fn prepare_update(
        &self,
        body: &PrepareUpdateRequest,
    ) -> Result<PrepareUpdateResponse> {
        let path = format!("/api/v1/admin/{}/update", self.project_id()?);
        self.request_json(Method::POST, &path, Some(body)).await
    }

    /// Finalize an uploaded update so the server starts serving it
    pub async fn commit_update(&self, update_id: &str) -> Result<()> {
        let path = format!(
            "/api/v1/admin/{}/update/{}/commit",
            self.project_id()?,
            update_id
        );
        self.request_empty(Method::POST, &path, None::<&()>).await
    }

    /// Revert a published update
    pub async fn rollback_update(&self, update_id: &str) -> Result<()> {
        let path = format!(
            "/api/v1/admin/{}/update/{}/rollback",
            self.project_id()?,
            update_id
        );
        self.request_empty(Method::POST, &path, None::<&()>).await
    }

    /// Fetch a single update
    pub async fn get_update(&self, update_id: &str) -> Result<Update> {
        let path = format!("/api/v1/admin/{}/update/{}", self.project_id()?, update_id);
        self.request_json(Method::GET, &path, None::<&()>).await
    }

    /// Fetch all updates for the configured project
    pub async fn list_updates(&self) -> Result<Vec<Update>> {
        let path = format!("/api/v1/admin/{}/updates", self.project_id()?);
        self.request_json(Method::GET, &path, None::<&()>).await
    }

    /// Create a remote project
    pub async fn create_project(&self, name: &str, protocol: UpdateProtocol) -> Result<Project> {
        let body = CreateProjectRequest {
            name: name.to_string(),
            update_protocol: protocol,
        };
        self.request_json(Method::POST, "/api/v1/admin/project", Some(&body))
            .await
    }

    /// Fetch an existing project by id
    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        let path = format!("/api/v1/admin/project/{}", project_id);
        self.request_json(Method::GET, &path, None::<&()>).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn project_id(&self) -> Result<&str> {
        self.project_id.as_deref().ok_or_else(|| {
            CliError::InvalidState {
                reason: "No project is configured".to_string(),
            }
            .into()
        })
    }

    async fn request_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = self.url(path);
        let response = self.send(method.clone(), &url, body).await?;
        response.json().await.map_err(|e| {
            ApiError::Transport {
                method: method.to_string(),
                url,
                reason: format!("invalid response body: {}", e),
            }
            .into()
        })
    }

    async fn request_empty<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let url = self.url(path);
        self.send(method, &url, body).await?;
        Ok(())
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        debug!("calling {} {}", method, url);

        let mut request = self.http.request(method.clone(), url);
        if let Some(project_id) = &self.project_id {
            request = request.header(PROJECT_ID_HEADER, project_id);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body_text = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST
            && let Ok(invalid) = serde_json::from_str::<ValidationErrorResponse>(&body_text)
        {
            return Err(ApiError::Validation {
                errors: invalid.errors,
            }
            .into());
        }

        Err(ApiError::RequestFailed {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body: body_text,
        }
        .into())
    }
}
