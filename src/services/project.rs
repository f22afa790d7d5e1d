//! Project operations.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "project";

/// Request body for creating or updating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRequest {
    /// Project name, unique within the organization.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A project as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectResponse {
    /// Server-assigned id.
    pub id: String,
    /// Owning organization id.
    pub organization_id: String,
    /// Project name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Service wrapping project endpoints.
#[derive(Debug, Clone)]
pub struct ProjectService {
    client: Arc<ApiClient>,
}

impl ProjectService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a project by id.
    pub async fn get(&self, id: &str) -> Result<ProjectResponse, ProviderError> {
        self.client
            .get(&format!("/project/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create a project under the organization.
    pub async fn create(
        &self,
        organization_id: &str,
        request: &ProjectRequest,
    ) -> Result<ProjectResponse, ProviderError> {
        self.client
            .post(&format!("/organization/{}/project", organization_id), request)
            .await
    }

    /// Update a project.
    pub async fn update(
        &self,
        id: &str,
        request: &ProjectRequest,
    ) -> Result<ProjectResponse, ProviderError> {
        self.client
            .put(&format!("/project/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a project.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/project/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
