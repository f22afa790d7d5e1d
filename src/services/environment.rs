//! Environment operations.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "environment";

/// Request body for creating or updating an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentRequest {
    /// Environment name, unique within the project.
    pub name: String,
    /// Target cluster; when omitted the server picks the project default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    /// PRODUCTION, DEVELOPMENT, STAGING or PREVIEW; server default applies
    /// when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// An environment as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentResponse {
    /// Server-assigned id.
    pub id: String,
    /// Owning project id.
    pub project_id: String,
    /// Cluster the environment is deployed on.
    pub cluster_id: String,
    /// Environment name.
    pub name: String,
    /// Environment mode.
    pub mode: String,
}

/// Service wrapping environment endpoints.
#[derive(Debug, Clone)]
pub struct EnvironmentService {
    client: Arc<ApiClient>,
}

impl EnvironmentService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch an environment by id.
    pub async fn get(&self, id: &str) -> Result<EnvironmentResponse, ProviderError> {
        self.client
            .get(&format!("/environment/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create an environment under the project.
    pub async fn create(
        &self,
        project_id: &str,
        request: &EnvironmentRequest,
    ) -> Result<EnvironmentResponse, ProviderError> {
        self.client
            .post(&format!("/project/{}/environment", project_id), request)
            .await
    }

    /// Update an environment.
    pub async fn update(
        &self,
        id: &str,
        request: &EnvironmentRequest,
    ) -> Result<EnvironmentResponse, ProviderError> {
        self.client
            .put(&format!("/environment/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete an environment.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/environment/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
