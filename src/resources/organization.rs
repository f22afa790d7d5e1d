//! `qovery_organization` resource and data source.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
use crate::import_id::parse_bare_id;
use crate::resources::common::{optional_str, require_str};
use crate::schema::{Attribute, Schema};
use crate::services::organization::{OrganizationRequest, OrganizationResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn to_request(model: &Value) -> Result<OrganizationRequest, ProviderError> {
    Ok(OrganizationRequest {
        name: require_str(model, "name")?,
        plan: require_str(model, "plan")?,
        description: optional_str(model, "description"),
    })
}

fn to_state(response: OrganizationResponse) -> Value {
    json!({
        "id": response.id,
        "name": response.name,
        "plan": response.plan,
        "description": response.description,
    })
}

/// Managed `qovery_organization`.
pub struct OrganizationResource;

#[async_trait::async_trait]
impl ResourceHandler for OrganizationResource {
    fn type_name(&self) -> &'static str {
        "qovery_organization"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Name of the organization."),
            )
            .with_attribute(
                "plan",
                Attribute::required_string()
                    .with_description("Billing plan of the organization.")
                    .with_allowed_values(["FREE", "TEAM", "ENTERPRISE"]),
            )
            .with_attribute(
                "description",
                Attribute::optional_string().with_description("Description of the organization."),
            )
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let response = services.organizations.create(&to_request(&planned)?).await?;
        Ok(to_state(response))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let id = require_str(&state, "id")?;
        match services.organizations.get(&id).await {
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
            .organizations
            .update(&id, &to_request(&planned)?)
            .await?;
        Ok(to_state(response))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let id = require_str(&state, "id")?;
        match services.organizations.delete(&id).await {
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

/// Read-only `qovery_organization` lookup by id.
pub struct OrganizationDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for OrganizationDataSource {
    fn type_name(&self) -> &'static str {
        "qovery_organization"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("plan", Attribute::computed_string())
            .with_attribute("description", Attribute::computed_string())
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&config, "id")?;
        let response = services.organizations.get(&id).await?;
        Ok(to_state(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_all_user_fields() {
        let model = json!({"name": "acme", "plan": "TEAM", "description": "main org"});
        let request = to_request(&model).unwrap();
        assert_eq!(request.name, "acme");
        assert_eq!(request.plan, "TEAM");
        assert_eq!(request.description.as_deref(), Some("main org"));
    }

    #[test]
    fn missing_plan_is_a_configuration_error() {
        let err = to_request(&json!({"name": "acme"})).unwrap_err();
        assert!(err.summary().contains("plan"));
    }

    #[test]
    fn response_round_trips_through_state() {
        let response = OrganizationResponse {
            id: "org-1".into(),
            name: "acme".into(),
            plan: "TEAM".into(),
            description: None,
        };
        let state = to_state(response);
        assert_eq!(state["id"], "org-1");
        assert_eq!(state["description"], Value::Null);
    }
}
