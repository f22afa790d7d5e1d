//! `qovery_deployment_stage` resource.
//!
//! Ordering is expressed through the local-only `is_after`/`is_before`
//! attributes: after the primary upsert the stage is moved relative to the
//! named stage. The API never echoes ordering hints, so both stay plan-owned.

use crate::error::ProviderError;
use crate::handler::{ReadOutcome, ResourceHandler};
use crate::import_id::parse_scoped_id;
use crate::resources::common::{optional_str, require_str};
use crate::schema::{Attribute, Diagnostic, MergePolicy, Schema};
use crate::services::deployment_stage::{DeploymentStageRequest, DeploymentStageResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn to_request(model: &Value) -> Result<DeploymentStageRequest, ProviderError> {
    Ok(DeploymentStageRequest {
        name: require_str(model, "name")?,
        description: optional_str(model, "description"),
    })
}

fn to_state(response: DeploymentStageResponse, local: &Value) -> Value {
    json!({
        "id": response.id,
        "environment_id": response.environment_id,
        "name": response.name,
        "description": response.description,
        "is_after": local.get("is_after").cloned().unwrap_or(Value::Null),
        "is_before": local.get("is_before").cloned().unwrap_or(Value::Null),
    })
}

async fn apply_ordering(
    services: &ServiceBundle,
    stage_id: &str,
    model: &Value,
) -> Result<(), ProviderError> {
    if let Some(target) = optional_str(model, "is_after") {
        services.deployment_stages.move_after(stage_id, &target).await?;
    }
    if let Some(target) = optional_str(model, "is_before") {
        services.deployment_stages.move_before(stage_id, &target).await?;
    }
    Ok(())
}

/// Managed `qovery_deployment_stage`.
pub struct DeploymentStageResource;

#[async_trait::async_trait]
impl ResourceHandler for DeploymentStageResource {
    fn type_name(&self) -> &'static str {
        "qovery_deployment_stage"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "environment_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "is_after",
                Attribute::optional_string()
                    .with_description("Id of the stage this one runs after.")
                    .with_merge(MergePolicy::PlanOnly),
            )
            .with_attribute(
                "is_before",
                Attribute::optional_string()
                    .with_description("Id of the stage this one runs before.")
                    .with_merge(MergePolicy::PlanOnly),
            )
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        if optional_str(config, "is_after").is_some() && optional_str(config, "is_before").is_some()
        {
            return vec![Diagnostic::error("Conflicting stage ordering")
                .with_detail("set at most one of is_after and is_before")
                .with_attribute("is_after")];
        }
        Vec::new()
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let environment_id = require_str(&planned, "environment_id")?;
        let response = services
            .deployment_stages
            .create(&environment_id, &to_request(&planned)?)
            .await?;
        apply_ordering(services, &response.id, &planned).await?;
        Ok(to_state(response, &planned))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let id = require_str(&state, "id")?;
        match services.deployment_stages.get(&id).await {
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
        let response = services
            .deployment_stages
            .update(&id, &to_request(&planned)?)
            .await?;
        apply_ordering(services, &id, &planned).await?;
        Ok(to_state(response, &planned))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let id = require_str(&state, "id")?;
        match services.deployment_stages.delete(&id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn import(&self, _services: &ServiceBundle, id: &str) -> Result<Value, ProviderError> {
        let (environment_id, stage_id) = parse_scoped_id(id)?;
        Ok(json!({ "environment_id": environment_id, "id": stage_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::has_errors;

    #[test]
    fn both_ordering_hints_conflict() {
        let config = json!({
            "environment_id": "env-1",
            "name": "deploy",
            "is_after": "stage-1",
            "is_before": "stage-2",
        });
        assert!(has_errors(&DeploymentStageResource.validate(&config)));
    }

    #[test]
    fn ordering_hints_stay_plan_owned() {
        let response = DeploymentStageResponse {
            id: "stage-2".into(),
            environment_id: "env-1".into(),
            name: "deploy".into(),
            description: None,
        };
        let state = to_state(response, &json!({"is_after": "stage-1"}));
        assert_eq!(state["is_after"], "stage-1");
        assert_eq!(state["is_before"], Value::Null);
    }
}
