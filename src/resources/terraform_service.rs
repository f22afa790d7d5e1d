//! `qovery_terraform_service` resource.
//!
//! Variable values are write-through only: the API lists keys without values,
//! so state keeps the planned value per key and drops keys the server no
//! longer knows. The provisioned storage is re-fetched after each mutation as
//! a best-effort secondary call.

use crate::error::ProviderError;
use crate::handler::{ReadOutcome, ResourceHandler};
use crate::import_id::parse_bare_id;
use crate::resources::common::{
    collection, optional_bool, optional_i64, optional_str, require_str, retain_known_secrets,
    KeyValue,
};
use crate::schema::{Attribute, AttributeType, Block, Diagnostic, NestedBlock, Schema};
use crate::services::application::GitRepository;
use crate::services::terraform_service::{
    TerraformBackend, TerraformJobResources, TerraformServiceRequest, TerraformServiceResponse,
    TerraformVariableRequest,
};
use crate::services::ServiceBundle;
use serde_json::{json, Value};
use url::Url;

fn git_repository_from(model: &Value) -> Result<GitRepository, ProviderError> {
    let block = model
        .get("git_repository")
        .filter(|v| !v.is_null())
        .ok_or_else(|| ProviderError::InvalidConfiguration {
            summary: "Missing git_repository block".to_string(),
            detail: "a terraform service needs a git_repository block with a url".to_string(),
        })?;
    let url = require_str(block, "url")?;
    Url::parse(&url)
        .map_err(|e| ProviderError::Validation(format!("invalid git repository url: {}", e)))?;
    Ok(GitRepository {
        url,
        branch: optional_str(block, "branch"),
        root_path: optional_str(block, "root_path"),
    })
}

fn backend_from(model: &Value) -> Result<TerraformBackend, ProviderError> {
    let block = model.get("backend").filter(|v| !v.is_null());
    let kubernetes = block.and_then(|b| b.get("kubernetes")).filter(|v| !v.is_null());
    let user_configured = block
        .and_then(|b| b.get("user_configured"))
        .filter(|v| !v.is_null());
    match (kubernetes, user_configured) {
        (Some(_), Some(_)) => Err(ProviderError::InvalidConfiguration {
            summary: "Conflicting terraform backends".to_string(),
            detail: "configure either backend.kubernetes or backend.user_configured, not both"
                .to_string(),
        }),
        (None, Some(user)) => Ok(TerraformBackend {
            kubernetes: None,
            user_configured: Some(user.clone()),
        }),
        // Managed in-cluster state is the default.
        (kubernetes, None) => Ok(TerraformBackend {
            kubernetes: Some(kubernetes.cloned().unwrap_or_else(|| json!({}))),
            user_configured: None,
        }),
    }
}

fn to_request(model: &Value) -> Result<TerraformServiceRequest, ProviderError> {
    let variables: Vec<KeyValue> = collection(model, "variables")?;
    let job_resources = match model.get("job_resources").filter(|v| !v.is_null()) {
        Some(block) => Some(TerraformJobResources {
            cpu: optional_i64(block, "cpu").unwrap_or(500),
            memory: optional_i64(block, "memory").unwrap_or(512),
            storage_gb: optional_i64(block, "storage_gb").unwrap_or(1),
        }),
        None => None,
    };
    Ok(TerraformServiceRequest {
        name: require_str(model, "name")?,
        description: optional_str(model, "description"),
        terraform_version: require_str(model, "terraform_version")?,
        auto_approve: optional_bool(model, "auto_approve"),
        auto_deploy: optional_bool(model, "auto_deploy"),
        git_repository: git_repository_from(model)?,
        backend: backend_from(model)?,
        variables: variables
            .into_iter()
            .map(|v| TerraformVariableRequest {
                key: v.key,
                value: v.value,
            })
            .collect(),
        job_resources,
    })
}

fn to_state(
    response: TerraformServiceResponse,
    variables: &[KeyValue],
    local: &Value,
    provisioned_storage_gb: Option<i64>,
) -> Result<Value, ProviderError> {
    let job_resources = response.job_resources.map(|r| {
        json!({
            "cpu": r.cpu,
            "memory": r.memory,
            "storage_gb": r.storage_gb,
        })
    });
    Ok(json!({
        "id": response.id,
        "environment_id": response.environment_id,
        "name": response.name,
        "description": response.description,
        "terraform_version": response.terraform_version,
        "auto_approve": response.auto_approve,
        "auto_deploy": response.auto_deploy,
        "git_repository": {
            "url": response.git_repository.url,
            "branch": response.git_repository.branch,
            "root_path": response.git_repository.root_path,
        },
        "backend": local.get("backend").cloned().unwrap_or(Value::Null),
        "backend_type": response.backend_type,
        "variables": serde_json::to_value(variables)?,
        "job_resources": job_resources.unwrap_or(Value::Null),
        "provisioned_storage_gb": provisioned_storage_gb,
    }))
}

/// Re-fetch the provisioned storage. A failure is a warning: the primary
/// mutation already succeeded and the next read can retry.
async fn fetch_storage(services: &ServiceBundle, id: &str) -> Option<i64> {
    match services.terraform_services.storage(id).await {
        Ok(storage) => Some(storage.storage_gb),
        Err(e) => {
            tracing::warn!(terraform_service_id = id, error = %e, "failed to fetch storage");
            None
        }
    }
}

/// Managed `qovery_terraform_service`.
pub struct TerraformServiceResource;

#[async_trait::async_trait]
impl ResourceHandler for TerraformServiceResource {
    fn type_name(&self) -> &'static str {
        "qovery_terraform_service"
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
            .with_attribute("terraform_version", Attribute::required_string())
            .with_attribute(
                "auto_approve",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "auto_deploy",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute("backend_type", Attribute::computed_string())
            .with_attribute("provisioned_storage_gb", Attribute::computed_int64())
            .with_block(
                "git_repository",
                NestedBlock::single(
                    Block::new()
                        .with_attribute("url", Attribute::required_string())
                        .with_attribute("branch", Attribute::optional_string())
                        .with_attribute("root_path", Attribute::optional_string()),
                )
                .with_min_items(1),
            )
            .with_block(
                "backend",
                NestedBlock::single(
                    Block::new()
                        .with_block("kubernetes", NestedBlock::single(Block::new()))
                        .with_block(
                            "user_configured",
                            NestedBlock::single(Block::new()),
                        ),
                ),
            )
            .with_block(
                "variables",
                NestedBlock::set(
                    Block::new()
                        .with_attribute("key", Attribute::required_string())
                        .with_attribute("value", Attribute::required_string().sensitive()),
                ),
            )
            .with_block(
                "job_resources",
                NestedBlock::single(
                    Block::new()
                        .with_attribute(
                            "cpu",
                            Attribute::optional_int64().with_default(json!(500)),
                        )
                        .with_attribute(
                            "memory",
                            Attribute::optional_int64().with_default(json!(512)),
                        )
                        .with_attribute(
                            "storage_gb",
                            Attribute::optional_int64().with_default(json!(1)),
                        ),
                ),
            )
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let backend = config.get("backend").filter(|v| !v.is_null());
        let kubernetes = backend.and_then(|b| b.get("kubernetes")).filter(|v| !v.is_null());
        let user = backend
            .and_then(|b| b.get("user_configured"))
            .filter(|v| !v.is_null());
        if kubernetes.is_some() && user.is_some() {
            return vec![Diagnostic::error("Conflicting terraform backends")
                .with_detail(
                    "configure either backend.kubernetes or backend.user_configured, not both",
                )
                .with_attribute("backend")];
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
            .terraform_services
            .create(&environment_id, &to_request(&planned)?)
            .await?;
        let storage = fetch_storage(services, &response.id).await;
        let variables: Vec<KeyValue> = collection(&planned, "variables")?;
        to_state(response, &variables, &planned, storage)
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let id = require_str(&state, "id")?;
        let response = match services.terraform_services.get(&id).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(ReadOutcome::Removed),
            Err(e) => return Err(e),
        };

        // Listings carry keys only; values come from what we last sent.
        let server_keys: Vec<String> = services
            .terraform_services
            .variables(&id)
            .await?
            .into_iter()
            .map(|v| v.key)
            .collect();
        let state_variables: Vec<KeyValue> = collection(&state, "variables")?;
        let variables = retain_known_secrets(&state_variables, &server_keys);

        let storage = fetch_storage(services, &id).await;
        Ok(ReadOutcome::Found(to_state(
            response, &variables, &state, storage,
        )?))
    }

    async fn update(
        &self,
        services: &ServiceBundle,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&prior, "id")?;
        let response = services
            .terraform_services
            .update(&id, &to_request(&planned)?)
            .await?;
        let storage = fetch_storage(services, &id).await;
        let variables: Vec<KeyValue> = collection(&planned, "variables")?;
        to_state(response, &variables, &planned, storage)
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let id = require_str(&state, "id")?;
        match services.terraform_services.delete(&id).await {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::has_errors;

    fn base_model() -> Value {
        json!({
            "environment_id": "env-1",
            "name": "network",
            "terraform_version": "1.9.5",
            "git_repository": {"url": "https://github.com/acme/infra.git"},
        })
    }

    #[test]
    fn backend_defaults_to_kubernetes() {
        let request = to_request(&base_model()).unwrap();
        assert!(request.backend.kubernetes.is_some());
        assert!(request.backend.user_configured.is_none());
    }

    #[test]
    fn conflicting_backends_fail() {
        let mut model = base_model();
        model["backend"] = json!({"kubernetes": {}, "user_configured": {}});
        let err = to_request(&model).unwrap_err();
        assert!(err.summary().contains("backend"));
        assert!(has_errors(&TerraformServiceResource.validate(&model)));
    }

    #[test]
    fn user_configured_backend_wins_when_alone() {
        let mut model = base_model();
        model["backend"] = json!({"user_configured": {}});
        let request = to_request(&model).unwrap();
        assert!(request.backend.kubernetes.is_none());
        assert!(request.backend.user_configured.is_some());
    }

    #[test]
    fn variable_values_come_from_the_plan() {
        let response = TerraformServiceResponse {
            id: "tf-1".into(),
            environment_id: "env-1".into(),
            name: "network".into(),
            description: None,
            terraform_version: "1.9.5".into(),
            auto_approve: false,
            auto_deploy: false,
            git_repository: GitRepository {
                url: "https://github.com/acme/infra.git".into(),
                branch: None,
                root_path: None,
            },
            backend_type: "KUBERNETES".into(),
            job_resources: None,
        };
        let variables = vec![KeyValue {
            key: "vpc_cidr".into(),
            value: "10.0.0.0/16".into(),
        }];
        let state = to_state(response, &variables, &base_model(), Some(1)).unwrap();
        assert_eq!(state["variables"][0]["value"], "10.0.0.0/16");
        assert_eq!(state["provisioned_storage_gb"], 1);
        assert_eq!(state["backend_type"], "KUBERNETES");
    }
}
