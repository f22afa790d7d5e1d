//! `qovery_cluster` resource and data source.
//!
//! Clusters are organization-scoped: every call carries the organization id
//! and imports use the composite `"<organizationId>,<clusterId>"` form. For
//! self-managed clusters the kubeconfig is pushed after the primary upsert as
//! a best-effort secondary call.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
use crate::import_id::parse_scoped_id;
use crate::resources::common::{optional_i64, optional_str, require_str};
use crate::schema::{
    Attribute, AttributeType, Block, Diagnostic, MergePolicy, NestedBlock, Schema,
};
use crate::services::cluster::{ClusterFeatures, ClusterRequest, ClusterResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Map, Value};

const SELF_MANAGED: &str = "SELF_MANAGED";

fn features_from(model: &Value) -> Option<ClusterFeatures> {
    let block = model.get("features").filter(|v| !v.is_null())?;
    Some(ClusterFeatures {
        vpc_subnet: optional_str(block, "vpc_subnet"),
        static_ip: block.get("static_ip").and_then(Value::as_bool),
    })
}

fn to_request(model: &Value) -> Result<ClusterRequest, ProviderError> {
    let advanced_settings = match optional_str(model, "advanced_settings_json") {
        Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
            ProviderError::Validation(format!("advanced_settings_json is not valid JSON: {}", e))
        })?),
        None => None,
    };
    Ok(ClusterRequest {
        name: require_str(model, "name")?,
        cloud_provider: require_str(model, "cloud_provider")?,
        region: require_str(model, "region")?,
        kubernetes_mode: optional_str(model, "kubernetes_mode")
            .unwrap_or_else(|| "MANAGED".to_string()),
        description: optional_str(model, "description"),
        instance_type: optional_str(model, "instance_type"),
        min_running_nodes: optional_i64(model, "min_running_nodes"),
        max_running_nodes: optional_i64(model, "max_running_nodes"),
        features: features_from(model),
        advanced_settings,
    })
}

/// Build state from the server response, preserving the fields the server
/// does not echo (kubeconfig, the raw advanced-settings text).
fn to_state(organization_id: &str, response: ClusterResponse, local: &Value) -> Value {
    let features = response.features.map(|f| {
        json!({
            "vpc_subnet": f.vpc_subnet,
            "static_ip": f.static_ip,
        })
    });
    let mut state = Map::new();
    state.insert("id".into(), json!(response.id));
    state.insert("organization_id".into(), json!(organization_id));
    state.insert("name".into(), json!(response.name));
    state.insert("cloud_provider".into(), json!(response.cloud_provider));
    state.insert("region".into(), json!(response.region));
    state.insert("kubernetes_mode".into(), json!(response.kubernetes_mode));
    state.insert("description".into(), json!(response.description));
    state.insert("instance_type".into(), json!(response.instance_type));
    state.insert("min_running_nodes".into(), json!(response.min_running_nodes));
    state.insert("max_running_nodes".into(), json!(response.max_running_nodes));
    state.insert("features".into(), features.unwrap_or(Value::Null));
    state.insert("status".into(), json!(response.status));
    state.insert(
        "advanced_settings_json".into(),
        local
            .get("advanced_settings_json")
            .cloned()
            .unwrap_or(Value::Null),
    );
    state.insert(
        "kubeconfig".into(),
        local.get("kubeconfig").cloned().unwrap_or(Value::Null),
    );
    Value::Object(state)
}

fn check_immutable(prior: &Value, planned: &Value) -> Result<(), ProviderError> {
    for attribute in ["cloud_provider", "region"] {
        let before = prior.get(attribute).filter(|v| !v.is_null());
        let after = planned.get(attribute).filter(|v| !v.is_null());
        if before.is_some() && after.is_some() && before != after {
            return Err(ProviderError::ImmutableAttribute {
                resource: "cluster",
                attribute: match attribute {
                    "cloud_provider" => "cloud_provider",
                    _ => "region",
                },
                detail: format!(
                    "cannot change from {} to {}; recreate the cluster instead",
                    before.and_then(Value::as_str).unwrap_or(""),
                    after.and_then(Value::as_str).unwrap_or("")
                ),
            });
        }
    }
    let before = prior
        .get("features")
        .and_then(|f| f.get("vpc_subnet"))
        .filter(|v| !v.is_null());
    let after = planned
        .get("features")
        .and_then(|f| f.get("vpc_subnet"))
        .filter(|v| !v.is_null());
    if before.is_some() && after.is_some() && before != after {
        return Err(ProviderError::ImmutableAttribute {
            resource: "cluster",
            attribute: "features.vpc_subnet",
            detail: "the VPC subnet is fixed at cluster creation".to_string(),
        });
    }
    Ok(())
}

/// Push the kubeconfig and read it back. A failure is a warning: the primary
/// cluster mutation already succeeded and the next read can retry.
async fn push_kubeconfig(
    services: &ServiceBundle,
    organization_id: &str,
    cluster_id: &str,
    kubeconfig: &str,
) {
    if let Err(e) = services
        .clusters
        .set_kubeconfig(organization_id, cluster_id, kubeconfig)
        .await
    {
        tracing::warn!(cluster_id, error = %e, "failed to push kubeconfig");
        return;
    }
    if let Err(e) = services
        .clusters
        .get_kubeconfig(organization_id, cluster_id)
        .await
    {
        tracing::warn!(cluster_id, error = %e, "failed to read back kubeconfig");
    }
}

/// Managed `qovery_cluster`.
pub struct ClusterResource;

#[async_trait::async_trait]
impl ResourceHandler for ClusterResource {
    fn type_name(&self) -> &'static str {
        "qovery_cluster"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "organization_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "cloud_provider",
                Attribute::required_string()
                    .with_description("Cloud provider hosting the cluster.")
                    .with_allowed_values(["AWS", "GCP", "SCW", "AZURE"])
                    .with_immutable(),
            )
            .with_attribute(
                "region",
                Attribute::required_string().with_immutable(),
            )
            .with_attribute(
                "kubernetes_mode",
                Attribute::optional_computed(AttributeType::String)
                    .with_default(json!("MANAGED"))
                    .with_allowed_values(["MANAGED", SELF_MANAGED]),
            )
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("instance_type", Attribute::optional_string())
            .with_attribute(
                "min_running_nodes",
                Attribute::optional_computed(AttributeType::Int64).with_range(Some(1), None),
            )
            .with_attribute(
                "max_running_nodes",
                Attribute::optional_computed(AttributeType::Int64).with_range(Some(1), None),
            )
            .with_attribute(
                "advanced_settings_json",
                Attribute::optional_string()
                    .with_description("Advanced settings as a raw JSON object.")
                    .with_merge(MergePolicy::PreferPlanIfPresent),
            )
            .with_attribute(
                "kubeconfig",
                Attribute::optional_computed(AttributeType::String)
                    .sensitive()
                    .with_description("Kubeconfig for self-managed clusters.")
                    .with_merge(MergePolicy::PlanOnly),
            )
            .with_attribute("status", Attribute::computed_string())
            .with_block(
                "features",
                NestedBlock::single(
                    Block::new()
                        .with_attribute("vpc_subnet", Attribute::optional_string())
                        .with_attribute("static_ip", Attribute::optional_bool()),
                ),
            )
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if let Some(raw) = optional_str(config, "advanced_settings_json") {
            if serde_json::from_str::<Value>(&raw).is_err() {
                diagnostics.push(
                    Diagnostic::error("Invalid advanced settings")
                        .with_detail("advanced_settings_json must be a valid JSON document")
                        .with_attribute("advanced_settings_json"),
                );
            }
        }
        diagnostics
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let organization_id = require_str(&planned, "organization_id")?;
        let request = to_request(&planned)?;
        let response = services.clusters.create(&organization_id, &request).await?;
        let cluster_id = response.id.clone();

        if request.kubernetes_mode == SELF_MANAGED {
            if let Some(kubeconfig) = optional_str(&planned, "kubeconfig") {
                push_kubeconfig(services, &organization_id, &cluster_id, &kubeconfig).await;
            }
        }
        Ok(to_state(&organization_id, response, &planned))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services.clusters.get(&organization_id, &id).await {
            Ok(response) => Ok(ReadOutcome::Found(to_state(&organization_id, response, &state))),
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
        check_immutable(&prior, &planned)?;
        let organization_id = require_str(&prior, "organization_id")?;
        let id = require_str(&prior, "id")?;
        let request = to_request(&planned)?;
        let response = services
            .clusters
            .update(&organization_id, &id, &request)
            .await?;

        if request.kubernetes_mode == SELF_MANAGED {
            let before = optional_str(&prior, "kubeconfig");
            let after = optional_str(&planned, "kubeconfig");
            if let Some(kubeconfig) = after.filter(|k| Some(k) != before.as_ref()) {
                push_kubeconfig(services, &organization_id, &id, &kubeconfig).await;
            }
        }
        Ok(to_state(&organization_id, response, &planned))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services.clusters.delete(&organization_id, &id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn import(&self, _services: &ServiceBundle, id: &str) -> Result<Value, ProviderError> {
        let (organization_id, cluster_id) = parse_scoped_id(id)?;
        Ok(json!({ "organization_id": organization_id, "id": cluster_id }))
    }
}

/// Read-only `qovery_cluster` lookup by organization and id.
pub struct ClusterDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for ClusterDataSource {
    fn type_name(&self) -> &'static str {
        "qovery_cluster"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("organization_id", Attribute::required_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("cloud_provider", Attribute::computed_string())
            .with_attribute("region", Attribute::computed_string())
            .with_attribute("kubernetes_mode", Attribute::computed_string())
            .with_attribute("instance_type", Attribute::computed_string())
            .with_attribute("min_running_nodes", Attribute::computed_int64())
            .with_attribute("max_running_nodes", Attribute::computed_int64())
            .with_attribute("status", Attribute::computed_string())
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let organization_id = require_str(&config, "organization_id")?;
        let id = require_str(&config, "id")?;
        let response = services.clusters.get(&organization_id, &id).await?;
        Ok(to_state(&organization_id, response, &config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_model() -> Value {
        json!({
            "organization_id": "org-1",
            "name": "prod",
            "cloud_provider": "AWS",
            "region": "eu-west-3",
        })
    }

    #[test]
    fn kubernetes_mode_defaults_to_managed() {
        let request = to_request(&base_model()).unwrap();
        assert_eq!(request.kubernetes_mode, "MANAGED");
    }

    #[test]
    fn malformed_advanced_settings_is_a_validation_error() {
        let mut model = base_model();
        model["advanced_settings_json"] = json!("{not json");
        let err = to_request(&model).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[test]
    fn region_change_is_rejected_with_the_field_name() {
        let prior = json!({"cloud_provider": "AWS", "region": "eu-west-3"});
        let planned = json!({"cloud_provider": "AWS", "region": "us-east-2"});
        let err = check_immutable(&prior, &planned).unwrap_err();
        assert!(format!("{}", err).contains("'region'"));
    }

    #[test]
    fn vpc_subnet_change_is_rejected() {
        let prior = json!({"features": {"vpc_subnet": "10.0.0.0/16"}});
        let planned = json!({"features": {"vpc_subnet": "10.1.0.0/16"}});
        let err = check_immutable(&prior, &planned).unwrap_err();
        assert!(format!("{}", err).contains("vpc_subnet"));
    }

    #[test]
    fn state_preserves_local_only_fields() {
        let local = json!({"kubeconfig": "apiVersion: v1", "advanced_settings_json": "{}"});
        let response = ClusterResponse {
            id: "c-1".into(),
            name: "prod".into(),
            cloud_provider: "AWS".into(),
            region: "eu-west-3".into(),
            kubernetes_mode: "SELF_MANAGED".into(),
            description: None,
            instance_type: None,
            min_running_nodes: None,
            max_running_nodes: None,
            features: None,
            status: Some("DEPLOYED".into()),
        };
        let state = to_state("org-1", response, &local);
        assert_eq!(state["kubeconfig"], "apiVersion: v1");
        assert_eq!(state["advanced_settings_json"], "{}");
        assert_eq!(state["status"], "DEPLOYED");
    }
}
