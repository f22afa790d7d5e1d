//! Terraform service operations.
//!
//! Variables are write-through only: the API accepts values on create and
//! update but `GET /terraform/{id}/variables` returns keys without values.
//! Callers that need the values must keep them from the last request.

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::services::application::GitRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "terraform service";

/// State backend selection. Exactly one of the two blocks must be set; the
/// handler rejects a request configuring both before it reaches this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TerraformBackend {
    /// Managed state storage inside the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<serde_json::Value>,
    /// Backend configured in the terraform files themselves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_configured: Option<serde_json::Value>,
}

/// A terraform input variable sent with create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerraformVariableRequest {
    /// Variable name.
    pub key: String,
    /// Variable value.
    pub value: String,
}

/// A terraform input variable as listed by the API. Values are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TerraformVariableResponse {
    /// Variable name.
    pub key: String,
    /// Always absent in listings.
    #[serde(default)]
    pub value: Option<String>,
}

/// Runner sizing for the terraform job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformJobResources {
    /// CPU in millicores.
    pub cpu: i64,
    /// Memory in MB.
    pub memory: i64,
    /// State and workspace storage in GB.
    pub storage_gb: i64,
}

/// Request body for creating or updating a terraform service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerraformServiceRequest {
    /// Service name.
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Terraform CLI version to run.
    pub terraform_version: String,
    /// Apply without manual approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_approve: Option<bool>,
    /// Re-deploy on upstream git changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_deploy: Option<bool>,
    /// Git source of the terraform files.
    pub git_repository: GitRepository,
    /// State backend.
    pub backend: TerraformBackend,
    /// Input variables, values included.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub variables: Vec<TerraformVariableRequest>,
    /// Runner sizing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_resources: Option<TerraformJobResources>,
}

/// A terraform service as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TerraformServiceResponse {
    /// Server-assigned id.
    pub id: String,
    /// Owning environment id.
    pub environment_id: String,
    /// Service name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Terraform CLI version.
    pub terraform_version: String,
    /// Apply without manual approval.
    #[serde(default)]
    pub auto_approve: bool,
    /// Re-deploy on upstream git changes.
    #[serde(default)]
    pub auto_deploy: bool,
    /// Git source of the terraform files.
    pub git_repository: GitRepository,
    /// Which backend is active: KUBERNETES or USER_CONFIGURED.
    pub backend_type: String,
    /// Runner sizing.
    pub job_resources: Option<TerraformJobResources>,
}

/// Storage actually provisioned for the service's state and workspace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TerraformStorageResponse {
    /// Storage in GB.
    pub storage_gb: i64,
}

/// Service wrapping terraform service endpoints.
#[derive(Debug, Clone)]
pub struct TerraformServiceService {
    client: Arc<ApiClient>,
}

impl TerraformServiceService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a terraform service by id.
    pub async fn get(&self, id: &str) -> Result<TerraformServiceResponse, ProviderError> {
        self.client
            .get(&format!("/terraform/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create a terraform service under the environment.
    pub async fn create(
        &self,
        environment_id: &str,
        request: &TerraformServiceRequest,
    ) -> Result<TerraformServiceResponse, ProviderError> {
        self.client
            .post(&format!("/environment/{}/terraform", environment_id), request)
            .await
    }

    /// Update a terraform service.
    pub async fn update(
        &self,
        id: &str,
        request: &TerraformServiceRequest,
    ) -> Result<TerraformServiceResponse, ProviderError> {
        self.client
            .put(&format!("/terraform/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a terraform service.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/terraform/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// List input variables. Values are withheld by the API.
    pub async fn variables(
        &self,
        id: &str,
    ) -> Result<Vec<TerraformVariableResponse>, ProviderError> {
        self.client
            .get(&format!("/terraform/{}/variables", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Fetch the provisioned storage for the service.
    pub async fn storage(&self, id: &str) -> Result<TerraformStorageResponse, ProviderError> {
        self.client
            .get(&format!("/terraform/{}/storage", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
