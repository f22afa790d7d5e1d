//! Provider lifecycle and CRUD dispatch.
//!
//! The provider holds exactly one configured service bundle for its process
//! lifetime, created at configure time and shared read-only by every handler.
//! Operations before configuration fail with a typed error, never a panic.

use crate::client::ApiClient;
use crate::error::ProviderError;
use crate::handler::ReadOutcome;
use crate::plan::{apply_merge_policies, plan_resource, PlanResult, SmartApiOverride};
use crate::resources::Registry;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::services::ServiceBundle;
use crate::validation;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::info;

enum ProviderState {
    Unconfigured,
    Configured(Arc<ServiceBundle>),
}

/// The Qovery provider: registry, plan policies, and the configured bundle.
pub struct QoveryProvider {
    registry: Registry,
    smart_override: SmartApiOverride,
    state: RwLock<ProviderState>,
}

impl QoveryProvider {
    /// Create an unconfigured provider with the full handler registry.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            smart_override: SmartApiOverride::default(),
            state: RwLock::new(ProviderState::Unconfigured),
        }
    }

    /// The full provider schema: config, resources, and data sources.
    pub fn schema(&self) -> ProviderSchema {
        self.registry.provider_schema()
    }

    /// Bind the provider to the API. The token comes from the `access_token`
    /// attribute or the `QOVERY_API_TOKEN` environment variable; `api_url`
    /// overrides the default endpoint.
    pub fn configure(&self, config: &Value) -> Result<(), ProviderError> {
        let api_url = config
            .get("api_url")
            .and_then(Value::as_str)
            .unwrap_or(crate::client::DEFAULT_API_URL)
            .to_string();
        let token = match config.get("access_token").and_then(Value::as_str) {
            Some(token) => token.to_string(),
            None => std::env::var(crate::client::TOKEN_ENV_VAR).map_err(|_| {
                ProviderError::InvalidConfiguration {
                    summary: "Missing API token".to_string(),
                    detail: format!(
                        "Set the provider's access_token attribute or the {} environment variable",
                        crate::client::TOKEN_ENV_VAR
                    ),
                }
            })?,
        };
        let client = ApiClient::new(&api_url, token);
        let bundle = Arc::new(ServiceBundle::new(Arc::new(client)));
        let mut state = self
            .state
            .write()
            .map_err(|_| ProviderError::Unconfigured)?;
        *state = ProviderState::Configured(bundle);
        info!(api_url, "provider configured");
        Ok(())
    }

    fn services(&self) -> Result<Arc<ServiceBundle>, ProviderError> {
        let state = self
            .state
            .read()
            .map_err(|_| ProviderError::Unconfigured)?;
        match &*state {
            ProviderState::Configured(bundle) => Ok(bundle.clone()),
            ProviderState::Unconfigured => Err(ProviderError::Unconfigured),
        }
    }

    /// Validate a resource configuration: schema rules first, then the
    /// handler's cross-field checks. Needs no network and no configuration.
    pub fn validate_resource_config(
        &self,
        type_name: &str,
        config: &Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let handler = self.registry.resource(type_name)?;
        let mut diagnostics = validation::validate(&handler.schema(), config);
        diagnostics.extend(handler.validate(config));
        Ok(diagnostics)
    }

    /// Validate a data source configuration against its schema.
    pub fn validate_data_source_config(
        &self,
        type_name: &str,
        config: &Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let handler = self.registry.data_source(type_name)?;
        Ok(validation::validate(&handler.schema(), config))
    }

    /// Plan a resource change: defaults, modifiers, and replacement detection.
    pub fn plan(
        &self,
        type_name: &str,
        prior: Option<&Value>,
        config: &Value,
    ) -> Result<PlanResult, ProviderError> {
        let handler = self.registry.resource(type_name)?;
        Ok(plan_resource(
            type_name,
            &handler.schema(),
            prior,
            config,
            &self.smart_override,
        ))
    }

    /// Create a resource from its planned state.
    pub async fn create(&self, type_name: &str, planned: Value) -> Result<Value, ProviderError> {
        let handler = self.registry.resource(type_name)?;
        let services = self.services()?;
        let mut state = handler.create(&services, planned.clone()).await?;
        apply_merge_policies(&handler.schema(), &mut state, &planned);
        Ok(state)
    }

    /// Refresh a resource. `None` means the resource is gone server-side and
    /// must be dropped from state.
    pub async fn read(
        &self,
        type_name: &str,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let handler = self.registry.resource(type_name)?;
        let services = self.services()?;
        match handler.read(&services, state.clone()).await? {
            ReadOutcome::Found(mut refreshed) => {
                apply_merge_policies(&handler.schema(), &mut refreshed, &state);
                Ok(Some(refreshed))
            }
            ReadOutcome::Removed => {
                info!(type_name, "resource gone server-side, dropping from state");
                Ok(None)
            }
        }
    }

    /// Apply planned changes to an existing resource.
    pub async fn update(
        &self,
        type_name: &str,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let handler = self.registry.resource(type_name)?;
        let services = self.services()?;
        let mut state = handler.update(&services, prior, planned.clone()).await?;
        apply_merge_policies(&handler.schema(), &mut state, &planned);
        Ok(state)
    }

    /// Delete a resource. Already-gone is success.
    pub async fn delete(&self, type_name: &str, state: Value) -> Result<(), ProviderError> {
        let handler = self.registry.resource(type_name)?;
        let services = self.services()?;
        handler.delete(&services, state).await
    }

    /// Adopt an existing resource by id, returning partial identity state.
    pub async fn import_resource(
        &self,
        type_name: &str,
        id: &str,
    ) -> Result<Value, ProviderError> {
        let handler = self.registry.resource(type_name)?;
        let services = self.services()?;
        handler.import(&services, id).await
    }

    /// Read a data source. A missing target is a hard error.
    pub async fn read_data_source(
        &self,
        type_name: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let handler = self.registry.data_source(type_name)?;
        let services = self.services()?;
        handler.read(&services, config).await
    }
}

impl Default for QoveryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn operations_before_configure_fail_with_a_typed_error() {
        let provider = QoveryProvider::new();
        let err = provider
            .read("qovery_project", json!({"id": "p-1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unconfigured));
    }

    #[test]
    fn schema_validation_rejects_bad_enums_without_configuration() {
        let provider = QoveryProvider::new();
        let diagnostics = provider
            .validate_resource_config(
                "qovery_cluster",
                &json!({
                    "organization_id": "org-1",
                    "name": "prod",
                    "cloud_provider": "INVALID",
                    "region": "eu-west-3",
                }),
            )
            .unwrap();
        assert!(crate::schema::has_errors(&diagnostics));
        assert!(diagnostics
            .iter()
            .any(|d| d.attribute.as_deref() == Some("cloud_provider")));
    }

    #[test]
    fn plan_applies_defaults_through_the_registry() {
        let provider = QoveryProvider::new();
        let plan = provider
            .plan(
                "qovery_application",
                None,
                &json!({
                    "environment_id": "env-1",
                    "name": "backend",
                    "git_repository": {"url": "https://github.com/acme/backend.git"},
                }),
            )
            .unwrap();
        assert_eq!(plan.planned_state["cpu"], json!(500));
        assert_eq!(plan.planned_state["memory"], json!(512));
        assert_eq!(plan.planned_state["min_running_instances"], json!(1));
    }

    #[test]
    fn unknown_type_names_are_rejected() {
        let provider = QoveryProvider::new();
        assert!(provider.plan("qovery_widget", None, &json!({})).is_err());
    }
}
