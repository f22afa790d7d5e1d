//! `qovery_database` resource and data source.
//!
//! The engine type and deployment mode are fixed at creation, and storage can
//! grow but never shrink. Illegal transitions fail with a descriptive error
//! instead of being silently ignored.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
use crate::import_id::parse_bare_id;
use crate::resources::common::{optional_i64, optional_str, require_str};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::services::database::{DatabaseRequest, DatabaseResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn to_request(model: &Value) -> Result<DatabaseRequest, ProviderError> {
    Ok(DatabaseRequest {
        name: require_str(model, "name")?,
        r#type: require_str(model, "type")?,
        version: require_str(model, "version")?,
        mode: require_str(model, "mode")?,
        accessibility: optional_str(model, "accessibility"),
        cpu: optional_i64(model, "cpu"),
        memory: optional_i64(model, "memory"),
        storage: optional_i64(model, "storage"),
        instance_type: optional_str(model, "instance_type"),
    })
}

fn to_state(response: DatabaseResponse) -> Value {
    json!({
        "id": response.id,
        "environment_id": response.environment_id,
        "name": response.name,
        "type": response.r#type,
        "version": response.version,
        "mode": response.mode,
        "accessibility": response.accessibility,
        "cpu": response.cpu,
        "memory": response.memory,
        "storage": response.storage,
        "instance_type": response.instance_type,
        "host": response.host,
        "port": response.port,
        "login": response.login,
    })
}

fn check_transitions(prior: &Value, planned: &Value) -> Result<(), ProviderError> {
    for (attribute, name) in [("type", "type"), ("mode", "mode")] {
        let before = optional_str(prior, attribute);
        let after = optional_str(planned, attribute);
        if let (Some(before), Some(after)) = (&before, &after) {
            if before != after {
                return Err(ProviderError::ImmutableAttribute {
                    resource: "database",
                    attribute: match name {
                        "type" => "type",
                        _ => "mode",
                    },
                    detail: format!("cannot change from {} to {}", before, after),
                });
            }
        }
    }
    if let (Some(before), Some(after)) = (
        optional_i64(prior, "storage"),
        optional_i64(planned, "storage"),
    ) {
        if after < before {
            return Err(ProviderError::InvalidConfiguration {
                summary: "Database storage cannot shrink".to_string(),
                detail: format!(
                    "storage is {} GB and the plan requests {} GB; only growth is supported",
                    before, after
                ),
            });
        }
    }
    Ok(())
}

/// Managed `qovery_database`.
pub struct DatabaseResource;

#[async_trait::async_trait]
impl ResourceHandler for DatabaseResource {
    fn type_name(&self) -> &'static str {
        "qovery_database"
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
                "type",
                Attribute::required_string()
                    .with_description("Database engine. Fixed at creation.")
                    .with_allowed_values(["POSTGRESQL", "MYSQL", "MONGODB", "REDIS"])
                    .with_immutable(),
            )
            .with_attribute("version", Attribute::required_string())
            .with_attribute(
                "mode",
                Attribute::required_string()
                    .with_description("Deployment mode. Fixed at creation.")
                    .with_allowed_values(["CONTAINER", "MANAGED"])
                    .with_immutable(),
            )
            .with_attribute(
                "accessibility",
                Attribute::optional_computed(AttributeType::String)
                    .with_default(json!("PRIVATE"))
                    .with_allowed_values(["PUBLIC", "PRIVATE"]),
            )
            .with_attribute(
                "cpu",
                Attribute::optional_computed(AttributeType::Int64).with_range(Some(10), None),
            )
            .with_attribute(
                "memory",
                Attribute::optional_computed(AttributeType::Int64).with_range(Some(1), None),
            )
            .with_attribute(
                "storage",
                Attribute::optional_computed(AttributeType::Int64).with_range(Some(1), None),
            )
            .with_attribute("instance_type", Attribute::optional_string())
            .with_attribute("host", Attribute::computed_string())
            .with_attribute("port", Attribute::computed_int64())
            .with_attribute("login", Attribute::computed_string())
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let environment_id = require_str(&planned, "environment_id")?;
        let response = services
            .databases
            .create(&environment_id, &to_request(&planned)?)
            .await?;
        Ok(to_state(response))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let id = require_str(&state, "id")?;
        match services.databases.get(&id).await {
            Ok(response) => Ok(ReadOutcome::Found(to_state(response))),
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
        check_transitions(&prior, &planned)?;
        let id = require_str(&prior, "id")?;
        let response = services.databases.update(&id, &to_request(&planned)?).await?;
        Ok(to_state(response))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let id = require_str(&state, "id")?;
        match services.databases.delete(&id).await {
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

/// Read-only `qovery_database` lookup by id.
pub struct DatabaseDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for DatabaseDataSource {
    fn type_name(&self) -> &'static str {
        "qovery_database"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("environment_id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("type", Attribute::computed_string())
            .with_attribute("version", Attribute::computed_string())
            .with_attribute("mode", Attribute::computed_string())
            .with_attribute("accessibility", Attribute::computed_string())
            .with_attribute("cpu", Attribute::computed_int64())
            .with_attribute("memory", Attribute::computed_int64())
            .with_attribute("storage", Attribute::computed_int64())
            .with_attribute("host", Attribute::computed_string())
            .with_attribute("port", Attribute::computed_int64())
            .with_attribute("login", Attribute::computed_string())
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&config, "id")?;
        let response = services.databases.get(&id).await?;
        Ok(to_state(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_type_change_fails_with_the_field_name() {
        let prior = json!({"type": "REDIS", "mode": "CONTAINER"});
        let planned = json!({"type": "POSTGRESQL", "mode": "CONTAINER"});
        let err = check_transitions(&prior, &planned).unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("'type'"));
        assert!(err.detail().contains("REDIS"));
        assert!(err.detail().contains("POSTGRESQL"));
    }

    #[test]
    fn mode_change_fails() {
        let prior = json!({"type": "REDIS", "mode": "CONTAINER"});
        let planned = json!({"type": "REDIS", "mode": "MANAGED"});
        assert!(check_transitions(&prior, &planned).is_err());
    }

    #[test]
    fn storage_can_grow_but_not_shrink() {
        let prior = json!({"type": "REDIS", "mode": "CONTAINER", "storage": 20});
        let grown = json!({"type": "REDIS", "mode": "CONTAINER", "storage": 40});
        assert!(check_transitions(&prior, &grown).is_ok());

        let shrunk = json!({"type": "REDIS", "mode": "CONTAINER", "storage": 10});
        let err = check_transitions(&prior, &shrunk).unwrap_err();
        assert!(err.summary().contains("shrink"));
    }

    #[test]
    fn request_carries_engine_coordinates() {
        let model = json!({
            "environment_id": "env-1",
            "name": "db",
            "type": "POSTGRESQL",
            "version": "16",
            "mode": "CONTAINER",
            "storage": 10,
        });
        let request = to_request(&model).unwrap();
        assert_eq!(request.r#type, "POSTGRESQL");
        assert_eq!(request.storage, Some(10));
        assert!(request.instance_type.is_none());
    }
}
