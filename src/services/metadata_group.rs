//! Labels group and annotations group operations (organization-scoped).
//!
//! The two families share the same request/response shape; the group kind
//! selects the path segment.

use crate::client::ApiClient;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which metadata family a group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataGroupKind {
    Labels,
    Annotations,
}

impl MetadataGroupKind {
    /// Path segment used by the API.
    pub fn path_segment(self) -> &'static str {
        match self {
            MetadataGroupKind::Labels => "labelsGroup",
            MetadataGroupKind::Annotations => "annotationsGroup",
        }
    }

    fn resource_name(self) -> &'static str {
        match self {
            MetadataGroupKind::Labels => "labels group",
            MetadataGroupKind::Annotations => "annotations group",
        }
    }
}

/// A single key/value entry within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Entry key; the natural key of the collection.
    pub key: String,
    /// Entry value.
    pub value: String,
    /// Propagate the entry to cloud-provider resources (labels only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagate_to_cloud_provider: Option<bool>,
}

/// Request body for creating or updating a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataGroupRequest {
    /// Group name, unique within the organization.
    pub name: String,
    /// Entries, replaced wholesale on update.
    pub entries: Vec<MetadataEntry>,
}

/// A group as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataGroupResponse {
    /// Server-assigned id.
    pub id: String,
    /// Group name.
    pub name: String,
    /// Entries.
    #[serde(default)]
    pub entries: Vec<MetadataEntry>,
}

/// Service wrapping labels group and annotations group endpoints.
#[derive(Debug, Clone)]
pub struct MetadataGroupService {
    client: Arc<ApiClient>,
}

impl MetadataGroupService {
    /// Create the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a group by id.
    pub async fn get(
        &self,
        kind: MetadataGroupKind,
        organization_id: &str,
        id: &str,
    ) -> Result<MetadataGroupResponse, ProviderError> {
        self.client
            .get(&format!(
                "/organization/{}/{}/{}",
                organization_id,
                kind.path_segment(),
                id
            ))
            .await
            .map_err(|e| e.for_resource(kind.resource_name(), id))
    }

    /// Create a group under the organization.
    pub async fn create(
        &self,
        kind: MetadataGroupKind,
        organization_id: &str,
        request: &MetadataGroupRequest,
    ) -> Result<MetadataGroupResponse, ProviderError> {
        self.client
            .post(
                &format!("/organization/{}/{}", organization_id, kind.path_segment()),
                request,
            )
            .await
    }

    /// Update a group.
    pub async fn update(
        &self,
        kind: MetadataGroupKind,
        organization_id: &str,
        id: &str,
        request: &MetadataGroupRequest,
    ) -> Result<MetadataGroupResponse, ProviderError> {
        self.client
            .put(
                &format!(
                    "/organization/{}/{}/{}",
                    organization_id,
                    kind.path_segment(),
                    id
                ),
                request,
            )
            .await
            .map_err(|e| e.for_resource(kind.resource_name(), id))
    }

    /// Delete a group.
    pub async fn delete(
        &self,
        kind: MetadataGroupKind,
        organization_id: &str,
        id: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .delete(&format!(
                "/organization/{}/{}/{}",
                organization_id,
                kind.path_segment(),
                id
            ))
            .await
            .map_err(|e| e.for_resource(kind.resource_name(), id))
    }
}
