//! Container operations, including variables and secrets.

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::services::application::ServicePort;
use crate::services::variables::VariablesApi;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "container";

/// Request body for creating or updating a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRequest {
    /// Container name.
    pub name: String,
    /// Container registry holding the image.
    pub registry_id: String,
    /// Image name within the registry.
    pub image_name: String,
    /// Image tag.
    pub tag: String,
    /// CPU in millicores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i64>,
    /// Memory in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    /// Autoscaling lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_running_instances: Option<i64>,
    /// Autoscaling upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_running_instances: Option<i64>,
    /// Command-line arguments passed to the entrypoint.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub arguments: Vec<String>,
    /// Exposed ports.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ports: Vec<ServicePort>,
}

/// A container as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerResponse {
    /// Server-assigned id.
    pub id: String,
    /// Owning environment id.
    pub environment_id: String,
    /// Container name.
    pub name: String,
    /// Container registry holding the image.
    pub registry_id: String,
    /// Image name within the registry.
    pub image_name: String,
    /// Image tag.
    pub tag: String,
    /// CPU in millicores.
    pub cpu: i64,
    /// Memory in MB.
    pub memory: i64,
    /// Autoscaling lower bound.
    pub min_running_instances: i64,
    /// Autoscaling upper bound.
    pub max_running_instances: i64,
    /// Command-line arguments.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Exposed ports, with server-assigned sub-ids.
    #[serde(default)]
    pub ports: Vec<ServicePort>,
    /// Public host, when any port is publicly accessible.
    pub external_host: Option<String>,
    /// In-cluster host.
    pub internal_host: Option<String>,
}

/// Service wrapping container endpoints.
#[derive(Debug, Clone)]
pub struct ContainerService {
    client: Arc<ApiClient>,
    /// Variable and secret operations scoped to containers.
    pub variables: VariablesApi,
}

impl ContainerService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        let variables = VariablesApi::new(client.clone(), RESOURCE);
        Self { client, variables }
    }

    /// Fetch a container by id.
    pub async fn get(&self, id: &str) -> Result<ContainerResponse, ProviderError> {
        self.client
            .get(&format!("/container/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create a container under the environment.
    pub async fn create(
        &self,
        environment_id: &str,
        request: &ContainerRequest,
    ) -> Result<ContainerResponse, ProviderError> {
        self.client
            .post(&format!("/environment/{}/container", environment_id), request)
            .await
    }

    /// Update a container.
    pub async fn update(
        &self,
        id: &str,
        request: &ContainerRequest,
    ) -> Result<ContainerResponse, ProviderError> {
        self.client
            .put(&format!("/container/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a container.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/container/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
