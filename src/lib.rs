//! Qovery provider
//!
//! This crate implements a declarative provider for the Qovery platform:
//! schemas, plan logic, and CRUD handlers for organizations, projects,
//! clusters, environments, services, and the supporting organization-scoped
//! resources (registries, credentials, git tokens, metadata groups).
//!
//! # Overview
//!
//! - **Schema types**: describe resources, data sources, and the provider
//!   config, including defaults, allowed values, and replacement rules
//! - **Plan**: applies defaults and plan modifiers, detects replacement, and
//!   reconciles refreshed server state with local-only attributes
//! - **Handlers**: one [`handler::ResourceHandler`] per resource family,
//!   stateless over a shared [`services::ServiceBundle`]
//! - **Client**: a thin authenticated HTTP client over the Qovery REST API
//! - **Testing**: [`testing::ProviderTester`] for lifecycle tests against a
//!   mock server
//!
//! # Quick Start
//!
//! ```ignore
//! use qovery_provider::{init_logging, QoveryProvider};
//! use serde_json::json;
//!
//! init_logging();
//! let provider = QoveryProvider::new();
//! provider.configure(&json!({}))?; // token from QOVERY_API_TOKEN
//!
//! let plan = provider.plan(
//!     "qovery_project",
//!     None,
//!     &json!({"organization_id": "org-1", "name": "web"}),
//! )?;
//! let state = provider.create("qovery_project", plan.planned_state).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod handler;
pub mod import_id;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod reconcile;
pub mod resources;
pub mod schema;
pub mod services;
pub mod testing;
pub mod validation;

// Re-export main types at crate root
pub use client::ApiClient;
pub use error::ProviderError;
pub use handler::{DataSourceHandler, ReadOutcome, ResourceHandler};
pub use logging::{init_logging, try_init_logging};
pub use plan::{AttributeChange, PlanResult, SmartApiOverride};
pub use provider::QoveryProvider;
pub use resources::Registry;
pub use schema::{Diagnostic, ProviderSchema, Schema};
pub use services::ServiceBundle;
pub use validation::{validate, validate_result};

// Re-export async_trait for handler implementations
pub use async_trait::async_trait;

pub use serde_json;
pub use tracing;
