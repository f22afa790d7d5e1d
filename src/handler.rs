//! Resource and data-source handler contracts.
//!
//! A handler binds one resource type to its schema, cross-field validation,
//! and CRUD operations. Handlers are stateless: every operation is an
//! independent call bounded by a single apply step, and all dependencies
//! arrive through the provider-scoped [`ServiceBundle`].

use crate::error::ProviderError;
use crate::schema::{Diagnostic, Schema};
use crate::services::ServiceBundle;
use serde_json::Value;

/// Outcome of reading a managed resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The resource exists; state converges to this value.
    Found(Value),
    /// The resource is gone server-side; drop it from state silently.
    Removed,
}

/// CRUD contract for a managed resource type.
#[async_trait::async_trait]
pub trait ResourceHandler: Send + Sync {
    /// The public resource type name, e.g. `qovery_cluster`.
    fn type_name(&self) -> &'static str;

    /// The declarative attribute tree for this resource.
    fn schema(&self) -> Schema;

    /// Cross-field validation not expressible in the schema
    /// (e.g. dockerfile_path required when build_mode is DOCKER).
    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let _ = config;
        Vec::new()
    }

    /// Create the resource from the planned state. On success the server's
    /// response is authoritative; on failure no partial state is written.
    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Fetch current server truth. Not-found maps to [`ReadOutcome::Removed`].
    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError>;

    /// Apply the planned changes. Illegal immutable-field transitions fail
    /// with a descriptive error; not-found is an error here.
    async fn update(
        &self,
        services: &ServiceBundle,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the resource. Already-gone is success.
    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError>;

    /// Parse the import id and return partial state carrying the
    /// identity-bearing fields; a subsequent read fills in the rest.
    async fn import(&self, services: &ServiceBundle, id: &str) -> Result<Value, ProviderError>;
}

impl std::fmt::Debug for dyn ResourceHandler + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandler")
            .field("type_name", &self.type_name())
            .finish()
    }
}

/// Read-only contract for a data source type.
#[async_trait::async_trait]
pub trait DataSourceHandler: Send + Sync {
    /// The public data source type name.
    fn type_name(&self) -> &'static str;

    /// The declarative attribute tree for this data source.
    fn schema(&self) -> Schema;

    /// Fetch the data. Unlike a managed resource, a missing target is a
    /// hard error: a data source has no "disappeared, reconcile" semantics.
    async fn read(&self, services: &ServiceBundle, config: Value) -> Result<Value, ProviderError>;
}
