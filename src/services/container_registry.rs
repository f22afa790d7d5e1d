//! Container registry operations (organization-scoped).

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "container registry";

/// Kind-specific registry configuration. All fields are optional; which ones
/// apply depends on the registry kind. Secret fields are write-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Username (DOCKER_HUB, GITHUB_CR, GITLAB_CR, GENERIC_CR).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password or token. Never returned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Cloud region (ECR, SCALEWAY_CR).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// AWS access key id (ECR). Never returned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// AWS secret access key (ECR). Never returned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    /// Scaleway access key (SCALEWAY_CR). Never returned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaleway_access_key: Option<String>,
    /// Scaleway secret key (SCALEWAY_CR). Never returned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaleway_secret_key: Option<String>,
}

/// Request body for creating or updating a container registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRegistryRequest {
    /// Registry name, unique within the organization.
    pub name: String,
    /// DOCKER_HUB, ECR, SCALEWAY_CR, GITHUB_CR, GITLAB_CR or GENERIC_CR.
    pub kind: String,
    /// Registry URL.
    pub url: String,
    /// Kind-specific configuration, credentials included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<RegistryConfig>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A container registry as returned by the API. The config block comes back
/// stripped of every secret field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerRegistryResponse {
    /// Server-assigned id.
    pub id: String,
    /// Registry name.
    pub name: String,
    /// Registry kind.
    pub kind: String,
    /// Registry URL.
    pub url: String,
    /// Non-secret configuration.
    pub config: Option<RegistryConfig>,
    /// Free-form description.
    pub description: Option<String>,
}

/// Service wrapping container registry endpoints.
#[derive(Debug, Clone)]
pub struct ContainerRegistryService {
    client: Arc<ApiClient>,
}

impl ContainerRegistryService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a container registry by id.
    pub async fn get(
        &self,
        organization_id: &str,
        id: &str,
    ) -> Result<ContainerRegistryResponse, ProviderError> {
        self.client
            .get(&format!(
                "/organization/{}/containerRegistry/{}",
                organization_id, id
            ))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Register a container registry with the organization.
    pub async fn create(
        &self,
        organization_id: &str,
        request: &ContainerRegistryRequest,
    ) -> Result<ContainerRegistryResponse, ProviderError> {
        self.client
            .post(
                &format!("/organization/{}/containerRegistry", organization_id),
                request,
            )
            .await
    }

    /// Update a container registry.
    pub async fn update(
        &self,
        organization_id: &str,
        id: &str,
        request: &ContainerRegistryRequest,
    ) -> Result<ContainerRegistryResponse, ProviderError> {
        self.client
            .put(
                &format!(
                    "/organization/{}/containerRegistry/{}",
                    organization_id, id
                ),
                request,
            )
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a container registry.
    pub async fn delete(&self, organization_id: &str, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!(
                "/organization/{}/containerRegistry/{}",
                organization_id, id
            ))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
