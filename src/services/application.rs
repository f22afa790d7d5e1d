//! Application operations, including variables and secrets.

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::services::variables::VariablesApi;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "application";

/// Git source of an application build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepository {
    /// Repository URL.
    pub url: String,
    /// Branch to build; server default when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Path within the repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,
}

/// A persistent storage attached to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStorage {
    /// Server-assigned sub-id; absent on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Storage class (FAST_SSD).
    pub r#type: String,
    /// Size in GB.
    pub size_in_gb: i64,
    /// Mount point; the natural key of the collection.
    pub mount_point: String,
}

/// A port exposed by a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    /// Server-assigned sub-id; absent on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Port the service listens on; the natural key of the collection.
    pub internal_port: i64,
    /// Publicly exposed port, when publicly accessible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_port: Option<i64>,
    /// Whether the port is routed from the public host.
    pub publicly_accessible: bool,
    /// HTTP, GRPC, TCP or UDP.
    pub protocol: String,
    /// Optional port name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Request body for creating or updating an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRequest {
    /// Application name.
    pub name: String,
    /// BUILDPACKS or DOCKER.
    pub build_mode: String,
    /// Dockerfile path; required when build_mode is DOCKER.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile_path: Option<String>,
    /// Git source.
    pub git_repository: GitRepository,
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
    /// Persistent storages.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub storage: Vec<ServiceStorage>,
    /// Exposed ports.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ports: Vec<ServicePort>,
}

/// An application as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplicationResponse {
    /// Server-assigned id.
    pub id: String,
    /// Owning environment id.
    pub environment_id: String,
    /// Application name.
    pub name: String,
    /// Build mode.
    pub build_mode: String,
    /// Dockerfile path.
    pub dockerfile_path: Option<String>,
    /// Git source.
    pub git_repository: GitRepository,
    /// CPU in millicores.
    pub cpu: i64,
    /// Memory in MB.
    pub memory: i64,
    /// Autoscaling lower bound.
    pub min_running_instances: i64,
    /// Autoscaling upper bound.
    pub max_running_instances: i64,
    /// Persistent storages, with server-assigned sub-ids.
    #[serde(default)]
    pub storage: Vec<ServiceStorage>,
    /// Exposed ports, with server-assigned sub-ids.
    #[serde(default)]
    pub ports: Vec<ServicePort>,
    /// Public host, when any port is publicly accessible.
    pub external_host: Option<String>,
    /// In-cluster host.
    pub internal_host: Option<String>,
}

/// Service wrapping application endpoints.
#[derive(Debug, Clone)]
pub struct ApplicationService {
    client: Arc<ApiClient>,
    /// Variable and secret operations scoped to applications.
    pub variables: VariablesApi,
}

impl ApplicationService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        let variables = VariablesApi::new(client.clone(), RESOURCE);
        Self { client, variables }
    }

    /// Fetch an application by id.
    pub async fn get(&self, id: &str) -> Result<ApplicationResponse, ProviderError> {
        self.client
            .get(&format!("/application/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create an application under the environment.
    pub async fn create(
        &self,
        environment_id: &str,
        request: &ApplicationRequest,
    ) -> Result<ApplicationResponse, ProviderError> {
        self.client
            .post(&format!("/environment/{}/application", environment_id), request)
            .await
    }

    /// Update an application.
    pub async fn update(
        &self,
        id: &str,
        request: &ApplicationRequest,
    ) -> Result<ApplicationResponse, ProviderError> {
        self.client
            .put(&format!("/application/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete an application.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/application/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
