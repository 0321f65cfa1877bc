use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::TrackerConfig;
use crate::model::{Artifact, ProjectConfig};
use crate::query::error::QueryError;

/// Source of the artifact collection. Only `type` is filtered server-side.
#[async_trait]
pub trait ArtifactProvider: Send + Sync {
    async fn fetch_artifacts(&self, type_filter: Option<&str>) -> Result<Vec<Artifact>, QueryError>;
}

/// REST client for the tracker API.
pub struct HttpArtifactProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpArtifactProvider {
    pub fn new(config: &TrackerConfig) -> Result<Self, QueryError> {
        let base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(QueryError::Config("api base url cannot be empty".to_string()));
        }
        if config.request_timeout_ms == 0 {
            return Err(QueryError::Config(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(config.request_timeout())
                .build()
                .map_err(|e| QueryError::Config(e.to_string()))?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn check_status(status: StatusCode) -> Result<(), QueryError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(QueryError::Status(status.as_u16()))
        }
    }

    /// Work-item types and statuses, loaded once at startup.
    pub async fn fetch_project_config(&self) -> Result<ProjectConfig, QueryError> {
        let response = self.client.get(self.endpoint("config")).send().await?;
        Self::check_status(response.status())?;
        let config: ProjectConfig = response.json().await?;
        tracing::info!(
            "loaded {} work-item types and {} statuses",
            config.work_item_types.len(),
            config.artifact_statuses.len()
        );
        Ok(config)
    }
}

#[async_trait]
impl ArtifactProvider for HttpArtifactProvider {
    async fn fetch_artifacts(&self, type_filter: Option<&str>) -> Result<Vec<Artifact>, QueryError> {
        let mut request = self.client.get(self.endpoint("artifacts"));
        if let Some(kind) = type_filter.filter(|kind| !kind.is_empty()) {
            request = request.query(&[("type", kind)]);
        }

        let response = request.send().await?;
        Self::check_status(response.status())?;
        let artifacts: Vec<Artifact> = response.json().await?;
        tracing::debug!(
            "fetched {} artifacts (type filter: {:?})",
            artifacts.len(),
            type_filter
        );
        Ok(artifacts)
    }
}

/// Fixed in-memory collection, filtered by type like the server would.
pub struct StaticArtifactProvider {
    artifacts: Vec<Artifact>,
}

impl StaticArtifactProvider {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self { artifacts }
    }
}

#[async_trait]
impl ArtifactProvider for StaticArtifactProvider {
    async fn fetch_artifacts(&self, type_filter: Option<&str>) -> Result<Vec<Artifact>, QueryError> {
        Ok(self
            .artifacts
            .iter()
            .filter(|a| type_filter.map_or(true, |kind| kind.is_empty() || a.kind == kind))
            .cloned()
            .collect())
    }
}
