//! Deployment stage operations.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "deployment stage";

/// Request body for creating or updating a deployment stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentStageRequest {
    /// Stage name, unique within the environment.
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A deployment stage as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeploymentStageResponse {
    /// Server-assigned id.
    pub id: String,
    /// Owning environment id.
    pub environment_id: String,
    /// Stage name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
}

/// Service wrapping deployment stage endpoints, ordering included.
#[derive(Debug, Clone)]
pub struct DeploymentStageService {
    client: Arc<ApiClient>,
}

impl DeploymentStageService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a deployment stage by id.
    pub async fn get(&self, id: &str) -> Result<DeploymentStageResponse, ProviderError> {
        self.client
            .get(&format!("/deploymentStage/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create a deployment stage under the environment.
    pub async fn create(
        &self,
        environment_id: &str,
        request: &DeploymentStageRequest,
    ) -> Result<DeploymentStageResponse, ProviderError> {
        self.client
            .post(
                &format!("/environment/{}/deploymentStage", environment_id),
                request,
            )
            .await
    }

    /// Update a deployment stage.
    pub async fn update(
        &self,
        id: &str,
        request: &DeploymentStageRequest,
    ) -> Result<DeploymentStageResponse, ProviderError> {
        self.client
            .put(&format!("/deploymentStage/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a deployment stage.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/deploymentStage/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Reorder the stage to run after `target_stage_id`.
    pub async fn move_after(
        &self,
        id: &str,
        target_stage_id: &str,
    ) -> Result<DeploymentStageResponse, ProviderError> {
        self.client
            .put(
                &format!("/deploymentStage/{}/moveAfter/{}", id, target_stage_id),
                &serde_json::json!({}),
            )
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Reorder the stage to run before `target_stage_id`.
    pub async fn move_before(
        &self,
        id: &str,
        target_stage_id: &str,
    ) -> Result<DeploymentStageResponse, ProviderError> {
        self.client
            .put(
                &format!("/deploymentStage/{}/moveBefore/{}", id, target_stage_id),
                &serde_json::json!({}),
            )
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
