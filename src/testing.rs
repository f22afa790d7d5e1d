//! Test harness for exercising the provider without a plugin host.
//!
//! [`ProviderTester`] wraps a [`QoveryProvider`] and folds diagnostics into
//! `Result`s so tests read as straight-line code. Point the provider at a
//! mock HTTP server through the `api_url` config attribute.

use crate::error::ProviderError;
use crate::plan::PlanResult;
use crate::provider::QoveryProvider;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use serde_json::Value;

/// A test harness around the provider.
pub struct ProviderTester {
    provider: QoveryProvider,
}

impl ProviderTester {
    /// Wrap a fresh, unconfigured provider.
    pub fn new() -> Self {
        Self {
            provider: QoveryProvider::new(),
        }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &QoveryProvider {
        &self.provider
    }

    /// The full provider schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Configure the provider from a config object.
    pub fn configure(&self, config: Value) -> Result<(), ProviderError> {
        self.provider.configure(&config)
    }

    /// Validate a resource configuration, failing on error diagnostics.
    pub fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, &config)?;
        check_diagnostics(diagnostics)
    }

    /// Validate a data source configuration, failing on error diagnostics.
    pub fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, &config)?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub fn plan_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, None, &config)
    }

    /// Plan a resource update.
    pub fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, Some(&prior_state), &config)
    }

    /// Create a resource from its planned state.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Refresh a resource. `None` means the resource is gone server-side.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource by id.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Value, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read_data_source(data_source_type, config).await
    }

    /// Full create lifecycle: validate, plan, create, read back.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_resource_config(resource_type, config.clone())?;
        let plan = self.plan_create(resource_type, config)?;
        let created = self.create(resource_type, plan.planned_state).await?;
        match self.read(resource_type, created).await? {
            Some(state) => Ok(state),
            None => Err(TestError::Provider(ProviderError::NotFound {
                resource: "resource",
                id: "created resource vanished on read-back".to_string(),
            })),
        }
    }

    /// Full update lifecycle: plan against prior state, update, read back.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, TestError> {
        let plan = self.plan_update(resource_type, prior_state.clone(), config)?;
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        match self.read(resource_type, updated).await? {
            Some(state) => Ok(state),
            None => Err(TestError::Provider(ProviderError::NotFound {
                resource: "resource",
                id: "updated resource vanished on read-back".to_string(),
            })),
        }
    }
}

impl Default for ProviderTester {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for harness operations that can fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// Validation produced error diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The provider returned an error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            TestError::Provider(e) => write!(f, "provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan updates in place.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not change the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "expected plan to change '{}'; changed paths: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error whose summary or detail mentions
/// the given substring.
///
/// # Panics
///
/// Panics if no error diagnostic matches.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let matched = diagnostics.iter().any(|d| {
        matches!(d.severity, DiagnosticSeverity::Error)
            && (d.summary.contains(substring)
                || d.detail.as_deref().is_some_and(|t| t.contains(substring)))
    });
    assert!(
        matched,
        "expected an error mentioning '{}'; errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_errors_surface_as_test_errors() {
        let tester = ProviderTester::new();
        let err = tester
            .validate_resource_config(
                "qovery_database",
                json!({
                    "environment_id": "env-1",
                    "name": "db",
                    "type": "SQLITE",
                    "mode": "CONTAINER",
                    "version": "3",
                    "storage_gb": 10,
                }),
            )
            .unwrap_err();
        let rendered = format!("{}", err);
        assert!(rendered.contains("type"));
    }

    #[test]
    fn plan_helpers_detect_replacement() {
        let tester = ProviderTester::new();
        let prior = json!({
            "id": "proj-1",
            "organization_id": "org-1",
            "name": "web",
        });
        let plan = tester
            .plan_update(
                "qovery_project",
                prior,
                json!({"organization_id": "org-2", "name": "web"}),
            )
            .unwrap();
        assert_plan_replaces(&plan);
        assert_plan_changes_attribute(&plan, "organization_id");
    }

    #[test]
    fn in_place_updates_are_not_replacements() {
        let tester = ProviderTester::new();
        let prior = json!({
            "id": "proj-1",
            "organization_id": "org-1",
            "name": "web",
        });
        let plan = tester
            .plan_update(
                "qovery_project",
                prior,
                json!({"organization_id": "org-1", "name": "web-renamed"}),
            )
            .unwrap();
        assert_plan_updates_in_place(&plan);
        assert_plan_changes_attribute(&plan, "name");
    }
}
