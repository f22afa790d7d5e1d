//! `qovery_container` resource and data source.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
use crate::import_id::parse_bare_id;
use crate::resources::common::{
    collection, create_variables, optional_i64, require_str, retain_known_secrets,
    sync_variables, KeyValue,
};
use crate::schema::{Attribute, AttributeType, Block, NestedBlock, Schema};
use crate::services::application::ServicePort;
use crate::services::container::{ContainerRequest, ContainerResponse};
use crate::services::variables::VariableKind;
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn to_request(model: &Value) -> Result<ContainerRequest, ProviderError> {
    Ok(ContainerRequest {
        name: require_str(model, "name")?,
        registry_id: require_str(model, "registry_id")?,
        image_name: require_str(model, "image_name")?,
        tag: require_str(model, "tag")?,
        cpu: optional_i64(model, "cpu"),
        memory: optional_i64(model, "memory"),
        min_running_instances: optional_i64(model, "min_running_instances"),
        max_running_instances: optional_i64(model, "max_running_instances"),
        arguments: collection::<String>(model, "arguments")?,
        ports: collection::<ServicePort>(model, "ports")?,
    })
}

fn to_state(
    response: ContainerResponse,
    environment_variables: &[KeyValue],
    secrets: &[KeyValue],
) -> Result<Value, ProviderError> {
    Ok(json!({
        "id": response.id,
        "environment_id": response.environment_id,
        "name": response.name,
        "registry_id": response.registry_id,
        "image_name": response.image_name,
        "tag": response.tag,
        "cpu": response.cpu,
        "memory": response.memory,
        "min_running_instances": response.min_running_instances,
        "max_running_instances": response.max_running_instances,
        "arguments": response.arguments,
        "ports": serde_json::to_value(&response.ports)?,
        "environment_variables": serde_json::to_value(environment_variables)?,
        "secrets": serde_json::to_value(secrets)?,
        "external_host": response.external_host,
        "internal_host": response.internal_host,
    }))
}

/// Managed `qovery_container`.
pub struct ContainerResource;

#[async_trait::async_trait]
impl ResourceHandler for ContainerResource {
    fn type_name(&self) -> &'static str {
        "qovery_container"
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
                "registry_id",
                Attribute::required_string()
                    .with_description("Container registry holding the image."),
            )
            .with_attribute("image_name", Attribute::required_string())
            .with_attribute("tag", Attribute::required_string())
            .with_attribute(
                "cpu",
                Attribute::optional_int64()
                    .with_default(json!(500))
                    .with_range(Some(10), None),
            )
            .with_attribute(
                "memory",
                Attribute::optional_int64()
                    .with_default(json!(512))
                    .with_range(Some(1), None),
            )
            .with_attribute(
                "min_running_instances",
                Attribute::optional_int64()
                    .with_default(json!(1))
                    .with_range(Some(0), None),
            )
            .with_attribute(
                "max_running_instances",
                Attribute::optional_int64()
                    .with_default(json!(1))
                    .with_range(Some(1), None),
            )
            .with_attribute(
                "arguments",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    crate::schema::AttributeFlags::optional(),
                ),
            )
            .with_attribute("external_host", Attribute::computed_string())
            .with_attribute("internal_host", Attribute::computed_string())
            .with_block(
                "ports",
                NestedBlock::list(
                    Block::new()
                        .with_attribute("id", Attribute::computed_string())
                        .with_attribute(
                            "internal_port",
                            Attribute::required_int64().with_range(Some(1), Some(65535)),
                        )
                        .with_attribute("external_port", Attribute::optional_int64())
                        .with_attribute(
                            "publicly_accessible",
                            Attribute::optional_bool().with_default(json!(false)),
                        )
                        .with_attribute(
                            "protocol",
                            Attribute::optional_computed(AttributeType::String)
                                .with_default(json!("HTTP"))
                                .with_allowed_values(["HTTP", "GRPC", "TCP", "UDP"]),
                        )
                        .with_attribute("name", Attribute::optional_string()),
                ),
            )
            .with_block(
                "environment_variables",
                NestedBlock::set(
                    Block::new()
                        .with_attribute("key", Attribute::required_string())
                        .with_attribute("value", Attribute::required_string()),
                ),
            )
            .with_block(
                "secrets",
                NestedBlock::set(
                    Block::new()
                        .with_attribute("key", Attribute::required_string())
                        .with_attribute("value", Attribute::required_string().sensitive()),
                ),
            )
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let environment_id = require_str(&planned, "environment_id")?;
        let response = services
            .containers
            .create(&environment_id, &to_request(&planned)?)
            .await?;

        let variables: Vec<KeyValue> = collection(&planned, "environment_variables")?;
        let secrets: Vec<KeyValue> = collection(&planned, "secrets")?;
        let api = &services.containers.variables;
        create_variables(api, &response.id, VariableKind::EnvironmentVariable, &variables).await?;
        create_variables(api, &response.id, VariableKind::Secret, &secrets).await?;

        to_state(response, &variables, &secrets)
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let id = require_str(&state, "id")?;
        let response = match services.containers.get(&id).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(ReadOutcome::Removed),
            Err(e) => return Err(e),
        };

        let api = &services.containers.variables;
        let variables: Vec<KeyValue> = api
            .list(&id, VariableKind::EnvironmentVariable)
            .await?
            .into_iter()
            .filter_map(|v| v.value.map(|value| KeyValue { key: v.key, value }))
            .collect();
        let secret_keys: Vec<String> = api
            .list(&id, VariableKind::Secret)
            .await?
            .into_iter()
            .map(|v| v.key)
            .collect();
        let state_secrets: Vec<KeyValue> = collection(&state, "secrets")?;
        let secrets = retain_known_secrets(&state_secrets, &secret_keys);

        Ok(ReadOutcome::Found(to_state(response, &variables, &secrets)?))
    }

    async fn update(
        &self,
        services: &ServiceBundle,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&prior, "id")?;
        let response = services.containers.update(&id, &to_request(&planned)?).await?;

        let api = &services.containers.variables;
        let prior_vars: Vec<KeyValue> = collection(&prior, "environment_variables")?;
        let planned_vars: Vec<KeyValue> = collection(&planned, "environment_variables")?;
        sync_variables(api, &id, VariableKind::EnvironmentVariable, &prior_vars, &planned_vars)
            .await?;

        let prior_secrets: Vec<KeyValue> = collection(&prior, "secrets")?;
        let planned_secrets: Vec<KeyValue> = collection(&planned, "secrets")?;
        sync_variables(api, &id, VariableKind::Secret, &prior_secrets, &planned_secrets).await?;

        to_state(response, &planned_vars, &planned_secrets)
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let id = require_str(&state, "id")?;
        match services.containers.delete(&id).await {
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

/// Read-only `qovery_container` lookup by id.
pub struct ContainerDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for ContainerDataSource {
    fn type_name(&self) -> &'static str {
        "qovery_container"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("environment_id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("registry_id", Attribute::computed_string())
            .with_attribute("image_name", Attribute::computed_string())
            .with_attribute("tag", Attribute::computed_string())
            .with_attribute("cpu", Attribute::computed_int64())
            .with_attribute("memory", Attribute::computed_int64())
            .with_attribute("external_host", Attribute::computed_string())
            .with_attribute("internal_host", Attribute::computed_string())
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&config, "id")?;
        let response = services.containers.get(&id).await?;
        to_state(response, &[], &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_coordinates_are_required() {
        let model = json!({
            "environment_id": "env-1",
            "name": "nginx",
            "registry_id": "reg-1",
            "image_name": "library/nginx",
        });
        let err = to_request(&model).unwrap_err();
        assert!(err.summary().contains("tag"));
    }

    #[test]
    fn arguments_default_to_empty() {
        let model = json!({
            "environment_id": "env-1",
            "name": "nginx",
            "registry_id": "reg-1",
            "image_name": "library/nginx",
            "tag": "1.27",
        });
        let request = to_request(&model).unwrap();
        assert!(request.arguments.is_empty());
        assert!(request.ports.is_empty());
    }
}
