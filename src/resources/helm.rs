//! `qovery_helm` resource and data source.
//!
//! `allow_cluster_wide_resources` is governed by the smart override policy in
//! [`crate::plan`]: the server forces it to true for charts that contain
//! cluster-wide resources, so an unset value stays unknown until the server
//! decides. `values_override` is never normalized server-side, the planned
//! text wins.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
use crate::import_id::parse_bare_id;
use crate::resources::common::{collection, optional_bool, optional_i64, optional_str, require_str};
use crate::schema::{
    Attribute, AttributeFlags, AttributeType, Block, MergePolicy, NestedBlock, Schema,
};
use crate::services::helm::{HelmChartSource, HelmRequest, HelmResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn chart_source_from(model: &Value) -> Result<HelmChartSource, ProviderError> {
    let block = model
        .get("repository")
        .filter(|v| !v.is_null())
        .ok_or_else(|| ProviderError::InvalidConfiguration {
            summary: "Missing repository block".to_string(),
            detail: "a helm release needs a repository block naming the chart".to_string(),
        })?;
    Ok(HelmChartSource {
        helm_repository_id: require_str(block, "helm_repository_id")?,
        chart_name: require_str(block, "chart_name")?,
        chart_version: require_str(block, "chart_version")?,
    })
}

fn to_request(model: &Value) -> Result<HelmRequest, ProviderError> {
    Ok(HelmRequest {
        name: require_str(model, "name")?,
        chart_source: chart_source_from(model)?,
        values_override: optional_str(model, "values_override"),
        allow_cluster_wide_resources: optional_bool(model, "allow_cluster_wide_resources"),
        arguments: collection::<String>(model, "arguments")?,
        timeout_sec: optional_i64(model, "timeout_sec"),
    })
}

fn to_state(response: HelmResponse, local: &Value) -> Value {
    // values_override is PreferPlanIfPresent: the server may normalize the
    // YAML, so the locally-known text wins when set.
    let values_override = optional_str(local, "values_override")
        .map(Value::String)
        .or_else(|| response.values_override.clone().map(Value::String))
        .unwrap_or(Value::Null);
    json!({
        "id": response.id,
        "environment_id": response.environment_id,
        "name": response.name,
        "repository": {
            "helm_repository_id": response.chart_source.helm_repository_id,
            "chart_name": response.chart_source.chart_name,
            "chart_version": response.chart_source.chart_version,
        },
        "values_override": values_override,
        "allow_cluster_wide_resources": response.allow_cluster_wide_resources,
        "arguments": response.arguments,
        "timeout_sec": response.timeout_sec,
    })
}

/// Managed `qovery_helm`.
pub struct HelmResource;

#[async_trait::async_trait]
impl ResourceHandler for HelmResource {
    fn type_name(&self) -> &'static str {
        "qovery_helm"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "environment_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "values_override",
                Attribute::optional_string()
                    .with_description("Raw values override, passed to helm verbatim.")
                    .with_merge(MergePolicy::PreferPlanIfPresent),
            )
            .with_attribute(
                "allow_cluster_wide_resources",
                Attribute::optional_computed(AttributeType::Bool)
                    .with_description("Whether the chart may install cluster-wide resources."),
            )
            .with_attribute(
                "arguments",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::optional(),
                ),
            )
            .with_attribute(
                "timeout_sec",
                Attribute::optional_int64()
                    .with_default(json!(600))
                    .with_range(Some(1), None),
            )
            .with_block(
                "repository",
                NestedBlock::single(
                    Block::new()
                        .with_attribute("helm_repository_id", Attribute::required_string())
                        .with_attribute("chart_name", Attribute::required_string())
                        .with_attribute("chart_version", Attribute::required_string()),
                )
                .with_min_items(1),
            )
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let environment_id = require_str(&planned, "environment_id")?;
        let response = services
            .helms
            .create(&environment_id, &to_request(&planned)?)
            .await?;
        Ok(to_state(response, &planned))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let id = require_str(&state, "id")?;
        match services.helms.get(&id).await {
            Ok(response) => Ok(ReadOutcome::Found(to_state(response, &state))),
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
        let id = require_str(&prior, "id")?;
        let response = services.helms.update(&id, &to_request(&planned)?).await?;
        Ok(to_state(response, &planned))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let id = require_str(&state, "id")?;
        match services.helms.delete(&id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn import(&self, _services: &ServiceBundle, id: &str) -> Result<Value, ProviderError> {
        let id = parse_bare_id(id)?;
        Ok(json!({ "id": id }))
    }
}

/// Read-only `qovery_helm` lookup by id.
pub struct HelmDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for HelmDataSource {
    fn type_name(&self) -> &'static str {
        "qovery_helm"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("environment_id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("allow_cluster_wide_resources", Attribute::computed_bool())
            .with_attribute("timeout_sec", Attribute::computed_int64())
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&config, "id")?;
        let response = services.helms.get(&id).await?;
        Ok(to_state(response, &Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_model() -> Value {
        json!({
            "environment_id": "env-1",
            "name": "redis",
            "repository": {
                "helm_repository_id": "repo-1",
                "chart_name": "redis",
                "chart_version": "19.0.1",
            },
        })
    }

    #[test]
    fn unset_override_flag_is_omitted_from_the_request() {
        let request = to_request(&base_model()).unwrap();
        assert!(request.allow_cluster_wide_resources.is_none());
    }

    #[test]
    fn explicit_false_is_forwarded() {
        let mut model = base_model();
        model["allow_cluster_wide_resources"] = json!(false);
        let request = to_request(&model).unwrap();
        assert_eq!(request.allow_cluster_wide_resources, Some(false));
    }

    #[test]
    fn missing_repository_block_is_a_configuration_error() {
        let err = to_request(&json!({"environment_id": "env-1", "name": "redis"})).unwrap_err();
        assert!(err.summary().contains("repository"));
    }

    #[test]
    fn planned_values_override_survives_server_normalization() {
        let response = HelmResponse {
            id: "h-1".into(),
            environment_id: "env-1".into(),
            name: "redis".into(),
            chart_source: HelmChartSource {
                helm_repository_id: "repo-1".into(),
                chart_name: "redis".into(),
                chart_version: "19.0.1".into(),
            },
            values_override: Some("replicaCount:   3".into()),
            allow_cluster_wide_resources: true,
            arguments: vec![],
            timeout_sec: Some(600),
        };
        let local = json!({"values_override": "replicaCount: 3"});
        let state = to_state(response, &local);
        assert_eq!(state["values_override"], "replicaCount: 3");
        assert_eq!(state["allow_cluster_wide_resources"], true);
    }
}
