//! Database operations.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "database";

/// Request body for creating or updating a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseRequest {
    /// Database name.
    pub name: String,
    /// POSTGRESQL, MYSQL, MONGODB or REDIS. Fixed at creation.
    pub r#type: String,
    /// Engine version.
    pub version: String,
    /// CONTAINER or MANAGED. Fixed at creation.
    pub mode: String,
    /// PUBLIC or PRIVATE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<String>,
    /// CPU in millicores (CONTAINER mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i64>,
    /// Memory in MB (CONTAINER mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    /// Storage in GB. Can grow, never shrink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<i64>,
    /// Cloud instance type (MANAGED mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

/// A database as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseResponse {
    /// Server-assigned id.
    pub id: String,
    /// Owning environment id.
    pub environment_id: String,
    /// Database name.
    pub name: String,
    /// Engine type.
    pub r#type: String,
    /// Engine version.
    pub version: String,
    /// Deployment mode.
    pub mode: String,
    /// Accessibility.
    pub accessibility: String,
    /// CPU in millicores.
    pub cpu: Option<i64>,
    /// Memory in MB.
    pub memory: Option<i64>,
    /// Storage in GB.
    pub storage: Option<i64>,
    /// Cloud instance type.
    pub instance_type: Option<String>,
    /// Connection host.
    pub host: Option<String>,
    /// Connection port.
    pub port: Option<i64>,
    /// Login user.
    pub login: Option<String>,
}

/// Service wrapping database endpoints.
#[derive(Debug, Clone)]
pub struct DatabaseService {
    client: Arc<ApiClient>,
}

impl DatabaseService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a database by id.
    pub async fn get(&self, id: &str) -> Result<DatabaseResponse, ProviderError> {
        self.client
            .get(&format!("/database/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Create a database under the environment.
    pub async fn create(
        &self,
        environment_id: &str,
        request: &DatabaseRequest,
    ) -> Result<DatabaseResponse, ProviderError> {
        self.client
            .post(&format!("/environment/{}/database", environment_id), request)
            .await
    }

    /// Update a database.
    pub async fn update(
        &self,
        id: &str,
        request: &DatabaseRequest,
    ) -> Result<DatabaseResponse, ProviderError> {
        self.client
            .put(&format!("/database/{}", id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a database.
    pub async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/database/{}", id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
