//! Cluster operations, including kubeconfig management.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const RESOURCE: &str = "cluster";

/// Cluster feature toggles sent on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClusterFeatures {
    /// VPC subnet CIDR; fixed at creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_subnet: Option<String>,
    /// Whether static IPs are provisioned for egress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_ip: Option<bool>,
}

/// Request body for creating or updating a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterRequest {
    /// Cluster name.
    pub name: String,
    /// Cloud provider (AWS, GCP, SCW, AZURE).
    pub cloud_provider: String,
    /// Cloud region.
    pub region: String,
    /// MANAGED or SELF_MANAGED.
    pub kubernetes_mode: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Node instance type, for managed clusters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Autoscaling lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_running_nodes: Option<i64>,
    /// Autoscaling upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_running_nodes: Option<i64>,
    /// Feature toggles; only honored on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<ClusterFeatures>,
    /// Free-form advanced settings, already validated as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_settings: Option<serde_json::Value>,
}

/// A cluster as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterResponse {
    /// Server-assigned id.
    pub id: String,
    /// Cluster name.
    pub name: String,
    /// Cloud provider.
    pub cloud_provider: String,
    /// Cloud region.
    pub region: String,
    /// MANAGED or SELF_MANAGED.
    pub kubernetes_mode: String,
    /// Optional description.
    pub description: Option<String>,
    /// Node instance type.
    pub instance_type: Option<String>,
    /// Autoscaling lower bound.
    pub min_running_nodes: Option<i64>,
    /// Autoscaling upper bound.
    pub max_running_nodes: Option<i64>,
    /// Feature toggles.
    pub features: Option<ClusterFeatures>,
    /// Deployment state reported by the server (e.g. DEPLOYED).
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
struct KubeconfigRequest<'a> {
    kubeconfig: &'a str,
}

#[derive(Debug, Deserialize)]
struct KubeconfigResponse {
    kubeconfig: String,
}

/// Service wrapping cluster endpoints.
#[derive(Debug, Clone)]
pub struct ClusterService {
    client: Arc<ApiClient>,
}

impl ClusterService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn path(organization_id: &str, cluster_id: &str) -> String {
        format!("/organization/{}/cluster/{}", organization_id, cluster_id)
    }

    /// Fetch a cluster by id within its organization.
    pub async fn get(
        &self,
        organization_id: &str,
        cluster_id: &str,
    ) -> Result<ClusterResponse, ProviderError> {
        self.client
            .get(&Self::path(organization_id, cluster_id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, cluster_id))
    }

    /// Create a cluster under the organization.
    pub async fn create(
        &self,
        organization_id: &str,
        request: &ClusterRequest,
    ) -> Result<ClusterResponse, ProviderError> {
        self.client
            .post(&format!("/organization/{}/cluster", organization_id), request)
            .await
    }

    /// Update a cluster.
    pub async fn update(
        &self,
        organization_id: &str,
        cluster_id: &str,
        request: &ClusterRequest,
    ) -> Result<ClusterResponse, ProviderError> {
        self.client
            .put(&Self::path(organization_id, cluster_id), request)
            .await
            .map_err(|e| e.for_resource(RESOURCE, cluster_id))
    }

    /// Delete a cluster.
    pub async fn delete(
        &self,
        organization_id: &str,
        cluster_id: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .delete(&Self::path(organization_id, cluster_id))
            .await
            .map_err(|e| e.for_resource(RESOURCE, cluster_id))
    }

    /// Push a kubeconfig for a self-managed cluster.
    pub async fn set_kubeconfig(
        &self,
        organization_id: &str,
        cluster_id: &str,
        kubeconfig: &str,
    ) -> Result<(), ProviderError> {
        let _: serde_json::Value = self
            .client
            .put(
                &format!("{}/kubeconfig", Self::path(organization_id, cluster_id)),
                &KubeconfigRequest { kubeconfig },
            )
            .await
            .map_err(|e| e.for_resource(RESOURCE, cluster_id))?;
        Ok(())
    }

    /// Fetch the stored kubeconfig.
    pub async fn get_kubeconfig(
        &self,
        organization_id: &str,
        cluster_id: &str,
    ) -> Result<String, ProviderError> {
        let response: KubeconfigResponse = self
            .client
            .get(&format!("{}/kubeconfig", Self::path(organization_id, cluster_id)))
            .await
            .map_err(|e| e.for_resource(RESOURCE, cluster_id))?;
        Ok(response.kubeconfig)
    }
}
