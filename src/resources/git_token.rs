//! `qovery_git_token` resource.

use crate::error::ProviderError;
use crate::handler::{ReadOutcome, ResourceHandler};
use crate::import_id::parse_scoped_id;
use crate::resources::common::{optional_str, require_str};
use crate::schema::{Attribute, Diagnostic, MergePolicy, Schema};
use crate::services::git_token::{GitTokenRequest, GitTokenResponse};
use crate::services::ServiceBundle;
use serde_json::{json, Value};

fn to_request(model: &Value) -> Result<GitTokenRequest, ProviderError> {
    Ok(GitTokenRequest {
        name: require_str(model, "name")?,
        r#type: require_str(model, "type")?,
        token: require_str(model, "token")?,
        workspace: optional_str(model, "workspace"),
        description: optional_str(model, "description"),
    })
}

/// The token value is write-only; state keeps the planned plaintext.
fn to_state(organization_id: &str, response: GitTokenResponse, local: &Value) -> Value {
    json!({
        "id": response.id,
        "organization_id": organization_id,
        "name": response.name,
        "type": response.r#type,
        "token": local.get("token").cloned().unwrap_or(Value::Null),
        "workspace": response.workspace,
        "description": response.description,
    })
}

/// Managed `qovery_git_token`.
pub struct GitTokenResource;

#[async_trait::async_trait]
impl ResourceHandler for GitTokenResource {
    fn type_name(&self) -> &'static str {
        "qovery_git_token"
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
                "type",
                Attribute::required_string()
                    .with_allowed_values(["GITHUB", "GITLAB", "BITBUCKET"]),
            )
            .with_attribute(
                "token",
                Attribute::required_string()
                    .sensitive()
                    .with_merge(MergePolicy::PreferPlanIfPresent),
            )
            .with_attribute(
                "workspace",
                Attribute::optional_string()
                    .with_description("Bitbucket workspace the token belongs to."),
            )
            .with_attribute("description", Attribute::optional_string())
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if optional_str(config, "type").as_deref() == Some("BITBUCKET")
            && optional_str(config, "workspace").is_none()
        {
            diagnostics.push(
                Diagnostic::error("Missing workspace")
                    .with_detail("workspace is required for BITBUCKET tokens")
                    .with_attribute("workspace"),
            );
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
            .git_tokens
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
        match services.git_tokens.get(&organization_id, &id).await {
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
            .git_tokens
            .update(&organization_id, &id, &to_request(&planned)?)
            .await?;
        Ok(to_state(&organization_id, response, &planned))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services.git_tokens.delete(&organization_id, &id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn import(&self, _services: &ServiceBundle, id: &str) -> Result<Value, ProviderError> {
        let (organization_id, token_id) = parse_scoped_id(id)?;
        Ok(json!({ "organization_id": organization_id, "id": token_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::has_errors;

    #[test]
    fn bitbucket_requires_a_workspace() {
        let config = json!({
            "organization_id": "org-1",
            "name": "ci",
            "type": "BITBUCKET",
            "token": "t",
        });
        assert!(has_errors(&GitTokenResource.validate(&config)));

        let config = json!({
            "organization_id": "org-1",
            "name": "ci",
            "type": "GITHUB",
            "token": "t",
        });
        assert!(GitTokenResource.validate(&config).is_empty());
    }

    #[test]
    fn token_plaintext_survives_the_response() {
        let response = GitTokenResponse {
            id: "gt-1".into(),
            name: "ci".into(),
            r#type: "GITHUB".into(),
            workspace: None,
            description: None,
        };
        let state = to_state("org-1", response, &json!({"token": "ghp_abc"}));
        assert_eq!(state["token"], "ghp_abc");
    }
}
