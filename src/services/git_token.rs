//! Git token operations (organization-scoped).

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "git token";

/// Request body for creating or updating a git token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitTokenRequest {
    /// Token name, unique within the organization.
    pub name: String,
    /// GITHUB, GITLAB or BITBUCKET.
    pub r#type: String,
    /// The token value. Never returned by the API.
    pub token: String,
    /// Bitbucket workspace; only meaningful for BITBUCKET tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A git token as returned by the API. The token value is write-only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitTokenResponse {
    /// Server-assigned id.
    pub id: String,
    /// Token name.
    pub name: String,
    /// Git provider.
    pub r#type: String,
    /// Bitbucket workspace.
    pub workspace: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

/// Service wrapping git token endpoints.
#[derive(Debug, Clone)]
pub struct GitTokenService {
    client: Arc<ApiClient>,
}

impl GitTokenService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a git token by id.
    pub async fn get(
        &self,
        organization_id: &str,
        id: &str,
    ) -> Result<GitTokenResponse, ProviderError> {
        self.client
            .get(&format!("/organization/{}/gitToken/{}", organization_id, id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Register a git token with the organization.
    pub async fn create(
        &self,
        organization_id: &str,
        request: &GitTokenRequest,
    ) -> Result<GitTokenResponse, ProviderError> {
        self.client
            .post(&format!("/organization/{}/gitToken", organization_id), request)
            .await
    }

    /// Update a git token.
    pub async fn update(
        &self,
        organization_id: &str,
        id: &str,
        request: &GitTokenRequest,
    ) -> Result<GitTokenResponse, ProviderError> {
        self.client
            .put(
                &format!("/organization/{}/gitToken/{}", organization_id, id),
                request,
            )
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a git token.
    pub async fn delete(&self, organization_id: &str, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete(&format!("/organization/{}/gitToken/{}", organization_id, id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}
