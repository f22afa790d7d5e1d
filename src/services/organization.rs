//! Organization operations.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "organization";

/// Request body for creating or updating an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationRequest {
    /// Organization name.
    pub name: String,
    /// Billing plan (FREE, TEAM, ENTERPRISE).
    pub plan: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An organization as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrganizationResponse {
    /// Server-assigned id.
    pub id: String,
    /// Organization name.
    pub name: String,
    /// Billing plan.
    pub plan: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Service wrapping organization endpoints.
#[derive(Debug, Clone)]
pub struct OrganizationService {
    client: Arc<ApiClient>,
}

impl OrganizationService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch an organization by id.
    pub async fn get(&self, id: &str) -> Result<OrganizationResponse, ProviderError> {
        self.client
            .get(&format!("/organization/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create an organization.
    pub async fn create(
        &self,
        request: &OrganizationRequest,
    ) -> Result<OrganizationResponse, ProviderError> {
        self.client.post("/organization", request).await
    }

    /// Update an organization.
    pub async fn update(
        &self,
        id: &str,
        request: &OrganizationRequest,
    ) -> Result<OrganizationResponse, ProviderError> {
        self.client
            .put(&format!("/organization/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete an organization.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/organization/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
