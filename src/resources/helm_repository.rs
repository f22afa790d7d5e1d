//! `qovery_helm_repository` resource.

use crate::error::ProviderError;
use crate::handler::{ReadOutcome, ResourceHandler};
use crate::import_id::parse_scoped_id;
use crate::resources::common::{optional_bool, optional_str, require_str};
use crate::schema::{Attribute, Diagnostic, MergePolicy, Schema};
use crate::services::helm_repository::{HelmRepositoryRequest, HelmRepositoryResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Value};
use url::Url;

fn to_request(model: &Value) -> Result<HelmRepositoryRequest, ProviderError> {
    let url = require_str(model, "url")?;
    Url::parse(&url)
        .map_err(|e| ProviderError::Validation(format!("invalid helm repository url: {}", e)))?;
    Ok(HelmRepositoryRequest {
        name: require_str(model, "name")?,
        kind: require_str(model, "kind")?,
        url,
        skip_tls_verification: optional_bool(model, "skip_tls_verification"),
        username: optional_str(model, "username"),
        password: optional_str(model, "password"),
        description: optional_str(model, "description"),
    })
}

/// Credentials are write-only: state keeps the locally-known values.
fn to_state(organization_id: &str, response: HelmRepositoryResponse, local: &Value) -> Value {
    json!({
        "id": response.id,
        "organization_id": organization_id,
        "name": response.name,
        "kind": response.kind,
        "url": response.url,
        "skip_tls_verification": response.skip_tls_verification,
        "username": local.get("username").cloned().unwrap_or(Value::Null),
        "password": local.get("password").cloned().unwrap_or(Value::Null),
        "description": response.description,
    })
}

/// Managed `qovery_helm_repository`.
pub struct HelmRepositoryResource;

#[async_trait::async_trait]
impl ResourceHandler for HelmRepositoryResource {
    fn type_name(&self) -> &'static str {
        "qovery_helm_repository"
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
                "kind",
                Attribute::required_string().with_allowed_values(["HTTPS", "OCI"]),
            )
            .with_attribute("url", Attribute::required_string())
            .with_attribute(
                "skip_tls_verification",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "username",
                Attribute::optional_string().with_merge(MergePolicy::PreferPlanIfPresent),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .sensitive()
                    .with_merge(MergePolicy::PreferPlanIfPresent),
            )
            .with_attribute("description", Attribute::optional_string())
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if let Some(url) = optional_str(config, "url") {
            if Url::parse(&url).is_err() {
                diagnostics.push(
                    Diagnostic::error("Invalid helm repository url")
                        .with_detail(format!("'{}' is not a valid url", url))
                        .with_attribute("url"),
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
        let response = services
            .helm_repositories
            .create(&organization_id, &to_request(&planned)?)
            .await?;
        Ok(to_state(&organization_id, response, &planned))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services.helm_repositories.get(&organization_id, &id).await {
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
        let organization_id = require_str(&prior, "organization_id")?;
        let id = require_str(&prior, "id")?;
        let response = services
            .helm_repositories
            .update(&organization_id, &id, &to_request(&planned)?)
            .await?;
        Ok(to_state(&organization_id, response, &planned))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services.helm_repositories.delete(&organization_id, &id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn import(&self, _services: &ServiceBundle, id: &str) -> Result<Value, ProviderError> {
        let (organization_id, repository_id) = parse_scoped_id(id)?;
        Ok(json!({ "organization_id": organization_id, "id": repository_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::has_errors;

    #[test]
    fn bad_url_fails_before_any_network_call() {
        let model = json!({
            "organization_id": "org-1",
            "name": "bitnami",
            "kind": "HTTPS",
            "url": "::::not-a-url",
        });
        assert!(to_request(&model).is_err());
        assert!(has_errors(&HelmRepositoryResource.validate(&model)));
    }

    #[test]
    fn credentials_survive_the_non_echoing_server() {
        let response = HelmRepositoryResponse {
            id: "repo-1".into(),
            name: "private".into(),
            kind: "OCI".into(),
            url: "oci://registry.acme.dev/charts".into(),
            skip_tls_verification: false,
            description: None,
        };
        let local = json!({"username": "deploy", "password": "hunter2"});
        let state = to_state("org-1", response, &local);
        assert_eq!(state["username"], "deploy");
        assert_eq!(state["password"], "hunter2");
    }
}
