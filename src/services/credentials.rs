//! Cloud credentials operations (organization-scoped).
//!
//! One service covers all four providers; the cloud kind selects the path
//! segment. Secret fields are write-only across the board, the API only ever
//! returns the credential name and id.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "credentials";

/// Cloud provider a set of credentials belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsKind {
    Aws,
    Gcp,
    Scaleway,
    Azure,
}

impl CredentialsKind {
    /// Path segment used by the API.
    pub fn path_segment(self) -> &'static str {
        match self {
            CredentialsKind::Aws => "aws",
            CredentialsKind::Gcp => "gcp",
            CredentialsKind::Scaleway => "scaleway",
            CredentialsKind::Azure => "azure",
        }
    }
}

/// AWS credentials payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwsCredentialsRequest {
    /// Credential set name.
    pub name: String,
    /// AWS access key id.
    pub access_key_id: String,
    /// AWS secret access key.
    pub secret_access_key: String,
}

/// GCP credentials payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GcpCredentialsRequest {
    /// Credential set name.
    pub name: String,
    /// Service-account key JSON, passed through verbatim.
    pub gcp_credentials: String,
}

/// Scaleway credentials payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalewayCredentialsRequest {
    /// Credential set name.
    pub name: String,
    /// Scaleway access key.
    pub scaleway_access_key: String,
    /// Scaleway secret key.
    pub scaleway_secret_key: String,
    /// Scaleway project id.
    pub scaleway_project_id: String,
}

/// Azure credentials payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AzureCredentialsRequest {
    /// Credential set name.
    pub name: String,
    /// Azure subscription id.
    pub azure_subscription_id: String,
    /// Azure tenant id.
    pub azure_tenant_id: String,
}

/// Credentials as returned by the API. Secrets never come back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialsResponse {
    /// Server-assigned id.
    pub id: String,
    /// Credential set name.
    pub name: String,
}

/// Service wrapping the per-cloud credentials endpoints.
#[derive(Debug, Clone)]
pub struct CredentialsService {
    client: Arc<ApiClient>,
}

impl CredentialsService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a credential set by id.
    pub async fn get(
        &self,
        kind: CredentialsKind,
        organization_id: &str,
        id: &str,
    ) -> Result<CredentialsResponse, ProviderError> {
        self.client
            .get(&format!(
                "/organization/{}/{}/credentials/{}",
                organization_id,
                kind.path_segment(),
                id
            ))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Register a credential set with the organization.
    pub async fn create<B: Serialize + Sync>(
        &self,
        kind: CredentialsKind,
        organization_id: &str,
        request: &B,
    ) -> Result<CredentialsResponse, ProviderError> {
        self.client
            .post(
                &format!(
                    "/organization/{}/{}/credentials",
                    organization_id,
                    kind.path_segment()
                ),
                request,
            )
            .await
    }

    /// Update a credential set.
    pub async fn update<B: Serialize + Sync>(
        &self,
        kind: CredentialsKind,
        organization_id: &str,
        id: &str,
        request: &B,
    ) -> Result<CredentialsResponse, ProviderError> {
        self.client
            .put(
                &format!(
                    "/organization/{}/{}/credentials/{}",
                    organization_id,
                    kind.path_segment(),
                    id
                ),
                request,
            )
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }

    /// Delete a credential set.
    pub async fn delete(
        &self,
        kind: CredentialsKind,
        organization_id: &str,
        id: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .delete(&format!(
                "/organization/{}/{}/credentials/{}",
                organization_id,
                kind.path_segment(),
                id
            ))
            .await
            .map_err(|e| e.for_resource(RESOURCE, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_match_cloud_names() {
        assert_eq!(CredentialsKind::Aws.path_segment(), "aws");
        assert_eq!(CredentialsKind::Gcp.path_segment(), "gcp");
        assert_eq!(CredentialsKind::Scaleway.path_segment(), "scaleway");
        assert_eq!(CredentialsKind::Azure.path_segment(), "azure");
    }
}
