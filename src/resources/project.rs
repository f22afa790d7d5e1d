//! `qovery_project` resource and data source.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
use crate::import_id::parse_bare_id;
use crate::resources::common::{optional_str, require_str};
use crate::schema::{Attribute, Schema};
use crate::services::project::{ProjectRequest, ProjectResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn to_request(model: &Value) -> Result<ProjectRequest, ProviderError> {
    Ok(ProjectRequest {
        name: require_str(model, "name")?,
        description: optional_str(model, "description"),
    })
}

fn to_state(response: ProjectResponse) -> Value {
    json!({
        "id": response.id,
        "organization_id": response.organization_id,
        "name": response.name,
        "description": response.description,
    })
}

/// Managed `qovery_project`.
pub struct ProjectResource;

#[async_trait::async_trait]
impl ResourceHandler for ProjectResource {
    fn type_name(&self) -> &'static str {
        "qovery_project"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "organization_id",
                Attribute::required_string()
                    .with_description("Id of the organization.")
                    .with_force_new(),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Name of the project."),
            )
            .with_attribute(
                "description",
                Attribute::optional_string().with_description("Description of the project."),
            )
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let organization_id = require_str(&planned, "organization_id")?;
        let response = services
            .projects
            .create(&organization_id, &to_request(&planned)?)
            .await?;
        Ok(to_state(response))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let id = require_str(&state, "id")?;
        match services.projects.get(&id).await {
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
        let response = services.projects.update(&id, &to_request(&planned)?).await?;
        Ok(to_state(response))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let id = require_str(&state, "id")?;
        match services.projects.delete(&id).await {
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

/// Read-only `qovery_project` lookup by id.
pub struct ProjectDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for ProjectDataSource {
    fn type_name(&self) -> &'static str {
        "qovery_project"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("organization_id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("description", Attribute::computed_string())
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&config, "id")?;
        let response = services.projects.get(&id).await?;
        Ok(to_state(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_absent_description() {
        let request = to_request(&json!({"name": "web", "organization_id": "org-1"})).unwrap();
        assert_eq!(request.name, "web");
        assert!(request.description.is_none());
    }

    #[test]
    fn state_carries_parent_scope() {
        let state = to_state(ProjectResponse {
            id: "p-1".into(),
            organization_id: "org-1".into(),
            name: "web".into(),
            description: None,
        });
        assert_eq!(state["organization_id"], "org-1");
    }
}
