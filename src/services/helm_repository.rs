//! Helm repository operations (organization-scoped).

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "helm repository";

/// Request body for creating or updating a helm repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelmRepositoryRequest {
    /// Repository name, unique within the organization.
    pub name: String,
    /// HTTPS or OCI.
    pub kind: String,
    /// Repository URL.
    pub url: String,
    /// Skip TLS certificate verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_tls_verification: Option<bool>,
    /// Basic-auth username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Basic-auth password. Never returned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A helm repository as returned by the API. Credentials are write-only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HelmRepositoryResponse {
    /// Server-assigned id.
    pub id: String,
    /// Repository name.
    pub name: String,
    /// HTTPS or OCI.
    pub kind: String,
    /// Repository URL.
    pub url: String,
    /// Skip TLS certificate verification.
    #[serde(default)]
    pub skip_tls_verification: bool,
    /// Free-form description.
    pub description: Option<String>,
}

/// Service wrapping helm repository endpoints.
#[derive(Debug, Clone)]
pub struct HelmRepositoryService {
    client: Arc<ApiClient>,
}

impl HelmRepositoryService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a helm repository by id.
    pub async fn get(
        &self,
        organization_id: &str,
        id: &str,
    ) -> Result<HelmRepositoryResponse, ProviderError> {
        self.client
            .get(&format!(
                "/organization/{}/helmRepository/{}",
                organization_id, id
            ))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Register a helm repository with the organization.
    pub async fn create(
        &self,
        organization_id: &str,
        request: &HelmRepositoryRequest,
    ) -> Result<HelmRepositoryResponse, ProviderError> {
        self.client
            .post(
                &format!("/organization/{}/helmRepository", organization_id),
                request,
            )
            .await
    }

    /// Update a helm repository.
    pub async fn update(
        &self,
        organization_id: &str,
        id: &str,
        request: &HelmRepositoryRequest,
    ) -> Result<HelmRepositoryResponse, ProviderError> {
        self.client
            .put(
                &format!("/organization/{}/helmRepository/{}", organization_id, id),
                request,
            )
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a helm repository.
    pub async fn delete(&self, organization_id: &str, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!(
                "/organization/{}/helmRepository/{}",
                organization_id, id
            ))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
