//! Helm release operations.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "helm";

/// Where a chart comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelmChartSource {
    /// Helm repository registered with the organization.
    pub helm_repository_id: String,
    /// Chart name within the repository.
    pub chart_name: String,
    /// Chart version.
    pub chart_version: String,
}

/// Request body for creating or updating a helm release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelmRequest {
    /// Release name.
    pub name: String,
    /// Chart source.
    pub chart_source: HelmChartSource,
    /// Raw values override (YAML), passed through verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_override: Option<String>,
    /// Whether the chart may install cluster-wide resources. The server
    /// forces this to true when the chart contains such resources; omit to
    /// accept the server's decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_cluster_wide_resources: Option<bool>,
    /// Extra helm CLI arguments.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub arguments: Vec<String>,
    /// Timeout for helm operations, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<i64>,
}

/// A helm release as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HelmResponse {
    /// Server-assigned id.
    pub id: String,
    /// Owning environment id.
    pub environment_id: String,
    /// Release name.
    pub name: String,
    /// Chart source.
    pub chart_source: HelmChartSource,
    /// Values override; the API may normalize or omit it.
    pub values_override: Option<String>,
    /// Effective cluster-wide permission after server-side rules.
    pub allow_cluster_wide_resources: bool,
    /// Extra helm CLI arguments.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Timeout in seconds.
    pub timeout_sec: Option<i64>,
}

/// Service wrapping helm endpoints.
#[derive(Debug, Clone)]
pub struct HelmService {
    client: Arc<ApiClient>,
}

impl HelmService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a helm release by id.
    pub async fn get(&self, id: &str) -> Result<HelmResponse, ProviderError> {
        self.client
            .get(&format!("/helm/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create a helm release under the environment.
    pub async fn create(
        &self,
        environment_id: &str,
        request: &HelmRequest,
    ) -> Result<HelmResponse, ProviderError> {
        self.client
            .post(&format!("/environment/{}/helm", environment_id), request)
            .await
    }

    /// Update a helm release.
    pub async fn update(
        &self,
        id: &str,
        request: &HelmRequest,
    ) -> Result<HelmResponse, ProviderError> {
        self.client
            .put(&format!("/helm/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a helm release.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/helm/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
