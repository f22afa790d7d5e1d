//! Shared environment-variable and secret operations.
//!
//! Applications and containers expose the same per-item variable endpoints;
//! this helper parameterizes the service root so both families reuse one
//! implementation. Secret values are write-only: listings return `None`.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which variable collection an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Plain environment variables; values are echoed by the API.
    EnvironmentVariable,
    /// Secrets; the API stores them hashed and never returns values.
    Secret,
}

impl VariableKind {
    fn path_segment(self) -> &'static str {
        match self {
            Self::EnvironmentVariable => "environmentVariable",
            Self::Secret => "secret",
        }
    }
}

/// Request body for creating or updating a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableRequest {
    /// Variable key; the natural key of the collection.
    pub key: String,
    /// Variable value (plaintext; sensitive for secrets).
    pub value: String,
}

/// A variable as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariableResponse {
    /// Server-assigned sub-id.
    pub id: String,
    /// Variable key.
    pub key: String,
    /// Value; `None` for secrets, which are never echoed back.
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VariableList {
    results: Vec<VariableResponse>,
}

/// Variable operations rooted at `/{resource}/{id}`.
#[derive(Debug, Clone)]
pub struct VariablesApi {
    client: Arc<ApiClient>,
    resource: &'static str,
}

impl VariablesApi {
    /// Create an API rooted at the given resource family path segment.
    pub fn new(client: Arc<ApiClient>, resource: &'static str) -> Self {
        Self { client, resource }
    }

    fn root(&self, service_id: &str, kind: VariableKind) -> String {
        format!("/{}/{}/{}", self.resource, service_id, kind.path_segment())
    }

    /// List all variables of the given kind.
    pub async fn list(
        &self,
        service_id: &str,
        kind: VariableKind,
    ) -> Result<Vec<VariableResponse>, ProviderError> {
        let list: VariableList = self.client.get(&self.root(service_id, kind)).await?;
        Ok(list.results)
    }

    /// Create a variable.
    pub async fn create(
        &self,
        service_id: &str,
        kind: VariableKind,
        request: &VariableRequest,
    ) -> Result<VariableResponse, ProviderError> {
        self.client.post(&self.root(service_id, kind), request).await
    }

    /// Update a variable by its server-assigned sub-id.
    pub async fn update(
        &self,
        service_id: &str,
        kind: VariableKind,
        variable_id: &str,
        request: &VariableRequest,
    ) -> Result<VariableResponse, ProviderError> {
        self.client
            .put(
                &format!("{}/{}", self.root(service_id, kind), variable_id),
                request,
            )
            .await
    }

    /// Delete a variable by its server-assigned sub-id.
    pub async fn delete(
        &self,
        service_id: &str,
        kind: VariableKind,
        variable_id: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("{}/{}", self.root(service_id, kind), variable_id))
            .await
    }
}
