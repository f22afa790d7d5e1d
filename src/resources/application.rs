//! `qovery_application` resource and data source.
//!
//! Environment variables and secrets are unordered collections keyed by
//! `key`, reconciled per-item against the variables API. Secret values are
//! write-only server-side; state keeps the planned plaintext and drops keys
//! the server no longer lists.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
use crate::import_id::parse_bare_id;
use crate::resources::common::{
    collection, create_variables, optional_i64, optional_str, require_str, retain_known_secrets,
    sync_variables, KeyValue,
};
use crate::schema::{Attribute, AttributeType, Block, Diagnostic, NestedBlock, Schema};
use crate::services::application::{
    ApplicationRequest, ApplicationResponse, GitRepository, ServicePort, ServiceStorage,
};
use crate::services::variables::VariableKind;
use crate::services::ServiceBundle;
use serde_json::{json, Value};
use url::Url;

fn git_repository_from(model: &Value) -> Result<GitRepository, ProviderError> {
    let block = model
        .get("git_repository")
        .filter(|v| !v.is_null())
        .ok_or_else(|| ProviderError::InvalidConfiguration {
            summary: "Missing git_repository block".to_string(),
            detail: "an application needs a git_repository block with a url".to_string(),
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

fn to_request(model: &Value) -> Result<ApplicationRequest, ProviderError> {
    Ok(ApplicationRequest {
        name: require_str(model, "name")?,
        build_mode: optional_str(model, "build_mode").unwrap_or_else(|| "BUILDPACKS".to_string()),
        dockerfile_path: optional_str(model, "dockerfile_path"),
        git_repository: git_repository_from(model)?,
        cpu: optional_i64(model, "cpu"),
        memory: optional_i64(model, "memory"),
        min_running_instances: optional_i64(model, "min_running_instances"),
        max_running_instances: optional_i64(model, "max_running_instances"),
        storage: collection::<ServiceStorage>(model, "storage")?,
        ports: collection::<ServicePort>(model, "ports")?,
    })
}

fn to_state(
    response: ApplicationResponse,
    environment_variables: &[KeyValue],
    secrets: &[KeyValue],
) -> Result<Value, ProviderError> {
    Ok(json!({
        "id": response.id,
        "environment_id": response.environment_id,
        "name": response.name,
        "build_mode": response.build_mode,
        "dockerfile_path": response.dockerfile_path,
        "git_repository": {
            "url": response.git_repository.url,
            "branch": response.git_repository.branch,
            "root_path": response.git_repository.root_path,
        },
        "cpu": response.cpu,
        "memory": response.memory,
        "min_running_instances": response.min_running_instances,
        "max_running_instances": response.max_running_instances,
        "storage": serde_json::to_value(&response.storage)?,
        "ports": serde_json::to_value(&response.ports)?,
        "environment_variables": serde_json::to_value(environment_variables)?,
        "secrets": serde_json::to_value(secrets)?,
        "external_host": response.external_host,
        "internal_host": response.internal_host,
    }))
}

fn key_value_block() -> Block {
    Block::new()
        .with_attribute("key", Attribute::required_string())
        .with_attribute("value", Attribute::required_string())
}

/// Cross-field rules shared by create and the standalone validate step.
fn check_cross_field(config: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let build_mode = optional_str(config, "build_mode").unwrap_or_else(|| "BUILDPACKS".to_string());
    if build_mode == "DOCKER" && optional_str(config, "dockerfile_path").is_none() {
        diagnostics.push(
            Diagnostic::error("Missing dockerfile path")
                .with_detail("dockerfile_path is required when build_mode is DOCKER")
                .with_attribute("dockerfile_path"),
        );
    }
    if let Some(url) = config
        .get("git_repository")
        .and_then(|b| b.get("url"))
        .and_then(Value::as_str)
    {
        if Url::parse(url).is_err() {
            diagnostics.push(
                Diagnostic::error("Invalid git repository url")
                    .with_detail(format!("'{}' is not a valid url", url))
                    .with_attribute("git_repository.url"),
            );
        }
    }
    diagnostics
}

/// Managed `qovery_application`.
pub struct ApplicationResource;

#[async_trait::async_trait]
impl ResourceHandler for ApplicationResource {
    fn type_name(&self) -> &'static str {
        "qovery_application"
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
                "build_mode",
                Attribute::optional_computed(AttributeType::String)
                    .with_default(json!("BUILDPACKS"))
                    .with_allowed_values(["BUILDPACKS", "DOCKER"]),
            )
            .with_attribute("dockerfile_path", Attribute::optional_string())
            .with_attribute(
                "cpu",
                Attribute::optional_int64()
                    .with_description("CPU in millicores.")
                    .with_default(json!(500))
                    .with_range(Some(10), None),
            )
            .with_attribute(
                "memory",
                Attribute::optional_int64()
                    .with_description("Memory in MB.")
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
            .with_attribute("external_host", Attribute::computed_string())
            .with_attribute("internal_host", Attribute::computed_string())
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
                "storage",
                NestedBlock::set(
                    Block::new()
                        .with_attribute("id", Attribute::computed_string())
                        .with_attribute(
                            "type",
                            Attribute::required_string().with_allowed_values(["FAST_SSD"]),
                        )
                        .with_attribute(
                            "size_in_gb",
                            Attribute::required_int64().with_range(Some(1), None),
                        )
                        .with_attribute("mount_point", Attribute::required_string()),
                ),
            )
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
                NestedBlock::set(key_value_block()),
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

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        check_cross_field(config)
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let environment_id = require_str(&planned, "environment_id")?;
        let response = services
            .applications
            .create(&environment_id, &to_request(&planned)?)
            .await?;

        let variables: Vec<KeyValue> = collection(&planned, "environment_variables")?;
        let secrets: Vec<KeyValue> = collection(&planned, "secrets")?;
        let api = &services.applications.variables;
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
        let response = match services.applications.get(&id).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(ReadOutcome::Removed),
            Err(e) => return Err(e),
        };

        let api = &services.applications.variables;
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
        let response = services
            .applications
            .update(&id, &to_request(&planned)?)
            .await?;

        let api = &services.applications.variables;
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
        match services.applications.delete(&id).await {
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

/// Read-only `qovery_application` lookup by id.
pub struct ApplicationDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for ApplicationDataSource {
    fn type_name(&self) -> &'static str {
        "qovery_application"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("environment_id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("build_mode", Attribute::computed_string())
            .with_attribute("cpu", Attribute::computed_int64())
            .with_attribute("memory", Attribute::computed_int64())
            .with_attribute("min_running_instances", Attribute::computed_int64())
            .with_attribute("max_running_instances", Attribute::computed_int64())
            .with_attribute("external_host", Attribute::computed_string())
            .with_attribute("internal_host", Attribute::computed_string())
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let id = require_str(&config, "id")?;
        let response = services.applications.get(&id).await?;
        to_state(response, &[], &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::has_errors;

    fn base_model() -> Value {
        json!({
            "environment_id": "env-1",
            "name": "backend",
            "git_repository": {"url": "https://github.com/acme/backend.git", "branch": "main"},
        })
    }

    #[test]
    fn build_mode_defaults_to_buildpacks() {
        let request = to_request(&base_model()).unwrap();
        assert_eq!(request.build_mode, "BUILDPACKS");
        assert!(request.dockerfile_path.is_none());
    }

    #[test]
    fn docker_without_dockerfile_path_fails_validation() {
        let mut model = base_model();
        model["build_mode"] = json!("DOCKER");
        let diagnostics = check_cross_field(&model);
        assert!(has_errors(&diagnostics));
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("dockerfile_path")
        );

        model["dockerfile_path"] = json!("Dockerfile");
        assert!(check_cross_field(&model).is_empty());
    }

    #[test]
    fn bad_git_url_is_rejected_before_any_network_call() {
        let mut model = base_model();
        model["git_repository"]["url"] = json!("not a url");
        assert!(has_errors(&check_cross_field(&model)));
        assert!(to_request(&model).is_err());
    }

    #[test]
    fn collections_round_trip_through_the_request() {
        let mut model = base_model();
        model["ports"] = json!([{
            "internal_port": 8080,
            "publicly_accessible": true,
            "protocol": "HTTP",
            "external_port": 443,
        }]);
        model["storage"] = json!([{
            "type": "FAST_SSD", "size_in_gb": 10, "mount_point": "/data"
        }]);
        let request = to_request(&model).unwrap();
        assert_eq!(request.ports[0].internal_port, 8080);
        assert_eq!(request.storage[0].mount_point, "/data");
    }

    #[test]
    fn name_round_trips_through_state() {
        let response = ApplicationResponse {
            id: "app-1".into(),
            environment_id: "env-1".into(),
            name: "backend".into(),
            build_mode: "BUILDPACKS".into(),
            dockerfile_path: None,
            git_repository: GitRepository {
                url: "https://github.com/acme/backend.git".into(),
                branch: Some("main".into()),
                root_path: None,
            },
            cpu: 500,
            memory: 512,
            min_running_instances: 1,
            max_running_instances: 1,
            storage: vec![],
            ports: vec![],
            external_host: None,
            internal_host: Some("app-z1".into()),
        };
        let secrets = vec![KeyValue {
            key: "API_KEY".into(),
            value: "s3cr3t".into(),
        }];
        let state = to_state(response, &[], &secrets).unwrap();
        assert_eq!(state["name"], "backend");
        assert_eq!(state["secrets"][0]["value"], "s3cr3t");
        assert_eq!(state["internal_host"], "app-z1");
    }
}
