//! `qovery_container_registry` resource.
//!
//! The config block is kind-specific and carries secrets the server strips
//! from every response, so state keeps the planned block wholesale.

use crate::error::ProviderError;
use crate::handler::{ReadOutcome, ResourceHandler};
use crate::import_id::parse_scoped_id;
use crate::resources::common::{optional_str, require_str};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};
use crate::services::container_registry::{
    ContainerRegistryRequest, ContainerRegistryResponse, RegistryConfig,
};
use crate::services::ServiceBundle;
use serde_json::{json, Value};
use url::Url;

const KINDS: [&str; 6] = [
    "DOCKER_HUB",
    "ECR",
    "SCALEWAY_CR",
    "GITHUB_CR",
    "GITLAB_CR",
    "GENERIC_CR",
];

fn config_from(model: &Value) -> Result<Option<RegistryConfig>, ProviderError> {
    match model.get("config").filter(|v| !v.is_null()) {
        Some(block) => Ok(Some(serde_json::from_value(block.clone())?)),
        None => Ok(None),
    }
}

fn to_request(model: &Value) -> Result<ContainerRegistryRequest, ProviderError> {
    let url = require_str(model, "url")?;
    Url::parse(&url)
        .map_err(|e| ProviderError::Validation(format!("invalid registry url: {}", e)))?;
    Ok(ContainerRegistryRequest {
        name: require_str(model, "name")?,
        kind: require_str(model, "kind")?,
        url,
        config: config_from(model)?,
        description: optional_str(model, "description"),
    })
}

/// The response strips secrets from the config block; the planned block wins.
fn to_state(organization_id: &str, response: ContainerRegistryResponse, local: &Value) -> Value {
    json!({
        "id": response.id,
        "organization_id": organization_id,
        "name": response.name,
        "kind": response.kind,
        "url": response.url,
        "config": local.get("config").cloned().unwrap_or(Value::Null),
        "description": response.description,
    })
}

/// Kind-specific requirements on the config block.
fn check_kind_config(config: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let Some(kind) = optional_str(config, "kind") else {
        return diagnostics;
    };
    let block = config.get("config").filter(|v| !v.is_null());
    let has = |field: &str| {
        block
            .and_then(|b| b.get(field))
            .and_then(Value::as_str)
            .is_some()
    };

    let missing: Vec<&str> = match kind.as_str() {
        "ECR" => ["region", "access_key_id", "secret_access_key"]
            .into_iter()
            .filter(|f| !has(f))
            .collect(),
        "SCALEWAY_CR" => ["region", "scaleway_access_key", "scaleway_secret_key"]
            .into_iter()
            .filter(|f| !has(f))
            .collect(),
        "GITHUB_CR" | "GITLAB_CR" => {
            // Credentials are optional for public registries, but a username
            // without a password (or the reverse) is always a mistake.
            if has("username") != has("password") {
                vec![if has("username") { "password" } else { "username" }]
            } else {
                Vec::new()
            }
        }
        "DOCKER_HUB" | "GENERIC_CR" => {
            if has("username") != has("password") {
                vec![if has("username") { "password" } else { "username" }]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    };

    for field in missing {
        diagnostics.push(
            Diagnostic::error(format!("Missing registry credential for {}", kind))
                .with_detail(format!("config.{} is required for kind {}", field, kind))
                .with_attribute(format!("config.{}", field)),
        );
    }
    diagnostics
}

/// Managed `qovery_container_registry`.
pub struct ContainerRegistryResource;

#[async_trait::async_trait]
impl ResourceHandler for ContainerRegistryResource {
    fn type_name(&self) -> &'static str {
        "qovery_container_registry"
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
                Attribute::required_string().with_allowed_values(KINDS),
            )
            .with_attribute("url", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_block(
                "config",
                NestedBlock::single(
                    Block::new()
                        .with_attribute("username", Attribute::optional_string())
                        .with_attribute("password", Attribute::optional_string().sensitive())
                        .with_attribute("region", Attribute::optional_string())
                        .with_attribute("access_key_id", Attribute::optional_string().sensitive())
                        .with_attribute(
                            "secret_access_key",
                            Attribute::optional_string().sensitive(),
                        )
                        .with_attribute(
                            "scaleway_access_key",
                            Attribute::optional_string().sensitive(),
                        )
                        .with_attribute(
                            "scaleway_secret_key",
                            Attribute::optional_string().sensitive(),
                        ),
                ),
            )
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = check_kind_config(config);
        if let Some(url) = optional_str(config, "url") {
            if Url::parse(&url).is_err() {
                diagnostics.push(
                    Diagnostic::error("Invalid registry url")
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
            .container_registries
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
        match services
            .container_registries
            .get(&organization_id, &id)
            .await
        {
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
            .container_registries
            .update(&organization_id, &id, &to_request(&planned)?)
            .await?;
        Ok(to_state(&organization_id, response, &planned))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services
            .container_registries
            .delete(&organization_id, &id)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn import(&self, _services: &ServiceBundle, id: &str) -> Result<Value, ProviderError> {
        let (organization_id, registry_id) = parse_scoped_id(id)?;
        Ok(json!({ "organization_id": organization_id, "id": registry_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::has_errors;

    #[test]
    fn ecr_requires_region_and_keys() {
        let config = json!({
            "kind": "ECR",
            "url": "https://123.dkr.ecr.eu-west-3.amazonaws.com",
            "config": {"region": "eu-west-3"},
        });
        let diagnostics = check_kind_config(&config);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .any(|d| d.attribute.as_deref() == Some("config.access_key_id")));
    }

    #[test]
    fn docker_hub_accepts_anonymous_or_full_credentials() {
        let anonymous = json!({"kind": "DOCKER_HUB", "config": null});
        assert!(check_kind_config(&anonymous).is_empty());

        let full = json!({
            "kind": "DOCKER_HUB",
            "config": {"username": "acme", "password": "p"},
        });
        assert!(check_kind_config(&full).is_empty());

        let half = json!({"kind": "DOCKER_HUB", "config": {"username": "acme"}});
        assert!(has_errors(&check_kind_config(&half)));
    }

    #[test]
    fn config_secrets_are_preserved_in_state() {
        let response = ContainerRegistryResponse {
            id: "reg-1".into(),
            name: "ecr".into(),
            kind: "ECR".into(),
            url: "https://123.dkr.ecr.eu-west-3.amazonaws.com".into(),
            config: Some(RegistryConfig {
                region: Some("eu-west-3".into()),
                ..Default::default()
            }),
            description: None,
        };
        let local = json!({
            "config": {
                "region": "eu-west-3",
                "access_key_id": "AKIA...",
                "secret_access_key": "secret",
            }
        });
        let state = to_state("org-1", response, &local);
        assert_eq!(state["config"]["secret_access_key"], "secret");
    }
}
