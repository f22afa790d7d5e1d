//! `qovery_labels_group` and `qovery_annotations_group` resources.
//!
//! The two families share shape and endpoints; one handler parameterized by
//! the metadata kind covers both. Entries are replaced wholesale on update.

use crate::error::ProviderError;
use crate::handler::{ReadOutcome, ResourceHandler};
use crate::import_id::parse_scoped_id;
use crate::resources::common::require_str;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::services::metadata_group::{
    MetadataEntry, MetadataGroupKind, MetadataGroupRequest, MetadataGroupResponse,
};
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn to_request(model: &Value, kind: MetadataGroupKind) -> Result<MetadataGroupRequest, ProviderError> {
    let mut entries: Vec<MetadataEntry> = match model.get("entries").filter(|v| !v.is_null()) {
        Some(v) => serde_json::from_value(v.clone())?,
        None => Vec::new(),
    };
    // Propagation only exists for labels.
    if kind == MetadataGroupKind::Annotations {
        for entry in &mut entries {
            entry.propagate_to_cloud_provider = None;
        }
    }
    Ok(MetadataGroupRequest {
        name: require_str(model, "name")?,
        entries,
    })
}

fn to_state(organization_id: &str, response: MetadataGroupResponse) -> Result<Value, ProviderError> {
    Ok(json!({
        "id": response.id,
        "organization_id": organization_id,
        "name": response.name,
        "entries": serde_json::to_value(&response.entries)?,
    }))
}

/// Managed labels or annotations group.
pub struct MetadataGroupResource {
    kind: MetadataGroupKind,
    type_name: &'static str,
}

impl MetadataGroupResource {
    /// `qovery_labels_group`.
    pub fn labels() -> Self {
        Self {
            kind: MetadataGroupKind::Labels,
            type_name: "qovery_labels_group",
        }
    }

    /// `qovery_annotations_group`.
    pub fn annotations() -> Self {
        Self {
            kind: MetadataGroupKind::Annotations,
            type_name: "qovery_annotations_group",
        }
    }
}

#[async_trait::async_trait]
impl ResourceHandler for MetadataGroupResource {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn schema(&self) -> Schema {
        let mut entry = Block::new()
            .with_attribute("key", Attribute::required_string())
            .with_attribute("value", Attribute::required_string());
        if self.kind == MetadataGroupKind::Labels {
            entry = entry.with_attribute(
                "propagate_to_cloud_provider",
                Attribute::optional_bool().with_default(json!(false)),
            );
        }
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "organization_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_block("entries", NestedBlock::set(entry).with_min_items(1))
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let organization_id = require_str(&planned, "organization_id")?;
        let response = services
            .metadata_groups
            .create(self.kind, &organization_id, &to_request(&planned, self.kind)?)
            .await?;
        to_state(&organization_id, response)
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services
            .metadata_groups
            .get(self.kind, &organization_id, &id)
            .await
        {
            Ok(response) => Ok(ReadOutcome::Found(to_state(&organization_id, response)?)),
            Err(e) if e.is_not_found() => Ok(ReadOutcome::Removed),
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        services: &ServiceBundle,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let organization_id = require_str(&prior, "organization_id")?;
        let id = require_str(&prior, "id")?;
        let response = services
            .metadata_groups
            .update(
                self.kind,
                &organization_id,
                &id,
                &to_request(&planned, self.kind)?,
            )
            .await?;
        to_state(&organization_id, response)
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services
            .metadata_groups
            .delete(self.kind, &organization_id, &id)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn import(&self, _services: &ServiceBundle, id: &str) -> Result<Value, ProviderError> {
        let (organization_id, group_id) = parse_scoped_id(id)?;
        Ok(json!({ "organization_id": organization_id, "id": group_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_schema_carries_propagation_but_annotations_do_not() {
        let labels = MetadataGroupResource::labels().schema();
        let entry = &labels.block.blocks["entries"].block;
        assert!(entry.attributes.contains_key("propagate_to_cloud_provider"));

        let annotations = MetadataGroupResource::annotations().schema();
        let entry = &annotations.block.blocks["entries"].block;
        assert!(!entry.attributes.contains_key("propagate_to_cloud_provider"));
    }

    #[test]
    fn annotations_strip_propagation_from_requests() {
        let model = json!({
            "organization_id": "org-1",
            "name": "team",
            "entries": [{"key": "owner", "value": "platform", "propagate_to_cloud_provider": true}],
        });
        let request = to_request(&model, MetadataGroupKind::Annotations).unwrap();
        assert!(request.entries[0].propagate_to_cloud_provider.is_none());

        let request = to_request(&model, MetadataGroupKind::Labels).unwrap();
        assert_eq!(request.entries[0].propagate_to_cloud_provider, Some(true));
    }
}
