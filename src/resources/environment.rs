//! `qovery_environment` resource and data source.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
use crate::import_id::parse_bare_id;
use crate::resources::common::{optional_str, require_str};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::services::environment::{EnvironmentRequest, EnvironmentResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn to_request(model: &Value) -> Result<EnvironmentRequest, ProviderError> {
    Ok(EnvironmentRequest {
        name: require_str(model, "name")?,
        cluster_id: optional_str(model, "cluster_id"),
        mode: optional_str(model, "mode"),
    })
}

fn to_state(response: EnvironmentResponse) -> Value {
    json!({
        "id": response.id,
        "project_id": response.project_id,
        "cluster_id": response.cluster_id,
        "name": response.name,
        "mode": response.mode,
    })
}

/// Managed `qovery_environment`.
pub struct EnvironmentResource;

#[async_trait::async_trait]
impl ResourceHandler for EnvironmentResource {
    fn type_name(&self) -> &'static str {
        "qovery_environment"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "project_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "cluster_id",
                Attribute::optional_computed(AttributeType::String)
                    .with_description("Target cluster; the project default when omitted.")
                    .with_force_new(),
            )
            .with_attribute(
                "mode",
                Attribute::optional_computed(AttributeType::String)
                    .with_allowed_values(["PRODUCTION", "DEVELOPMENT", "STAGING", "PREVIEW"]),
            )
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let project_id = require_str(&planned, "project_id")?;
        let response = services
            .environments
            .create(&project_id, &to_request(&planned)?)
            .await?;
        Ok(to_state(response))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let id = require_str(&state, "id")?;
        match services.environments.get(&id).await {
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
        let id = require_str(&prior, "id")?;
        let response = services
            .environments
            .update(&id, &to_request(&planned)?)
            .await?;
        Ok(to_state(response))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let id = require_str(&state, "id")?;
        match services.environments.delete(&id).await {
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

/// Read-only `qovery_environment` lookup by id.
pub struct EnvironmentDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for EnvironmentDataSource {
    fn type_name(&self) -> &'static str {
        "qovery_environment"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("project_id", Attribute::computed_string())
            .with_attribute("cluster_id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("mode", Attribute::computed_string())
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&config, "id")?;
        let response = services.environments.get(&id).await?;
        Ok(to_state(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_cluster_and_mode_defer_to_the_server() {
        let request = to_request(&json!({"name": "staging", "project_id": "p-1"})).unwrap();
        assert!(request.cluster_id.is_none());
        assert!(request.mode.is_none());
    }

    #[test]
    fn explicit_mode_is_forwarded() {
        let request = to_request(&json!({
            "name": "prod", "project_id": "p-1", "mode": "PRODUCTION"
        }))
        .unwrap();
        assert_eq!(request.mode.as_deref(), Some("PRODUCTION"));
    }
}
