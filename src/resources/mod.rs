//! Resource and data-source handlers, one module per resource family.

use crate::error::ProviderError;
use crate::handler::{DataSourceHandler, ResourceHandler};
use crate::schema::{Attribute, ProviderSchema, Schema};
use std::collections::HashMap;

pub mod application;
pub mod cluster;
pub mod common;
pub mod container;
pub mod container_registry;
pub mod credentials;
pub mod database;
pub mod deployment_stage;
pub mod environment;
pub mod git_token;
pub mod helm;
pub mod helm_repository;
pub mod metadata_group;
pub mod organization;
pub mod project;
pub mod terraform_service;

/// The provider's full handler registry, built once at startup.
pub struct Registry {
    resources: HashMap<&'static str, Box<dyn ResourceHandler>>,
    data_sources: HashMap<&'static str, Box<dyn DataSourceHandler>>,
}

impl Registry {
    /// Register every resource and data source the provider exposes.
    pub fn new() -> Self {
        let resource_handlers: Vec<Box<dyn ResourceHandler>> = vec![
            Box::new(organization::OrganizationResource),
            Box::new(project::ProjectResource),
            Box::new(cluster::ClusterResource),
            Box::new(environment::EnvironmentResource),
            Box::new(application::ApplicationResource),
            Box::new(container::ContainerResource),
            Box::new(database::DatabaseResource),
            Box::new(helm::HelmResource),
            Box::new(helm_repository::HelmRepositoryResource),
            Box::new(container_registry::ContainerRegistryResource),
            Box::new(credentials::CredentialsResource::aws()),
            Box::new(credentials::CredentialsResource::gcp()),
            Box::new(credentials::CredentialsResource::scaleway()),
            Box::new(credentials::CredentialsResource::azure()),
            Box::new(git_token::GitTokenResource),
            Box::new(deployment_stage::DeploymentStageResource),
            Box::new(terraform_service::TerraformServiceResource),
            Box::new(metadata_group::MetadataGroupResource::labels()),
            Box::new(metadata_group::MetadataGroupResource::annotations()),
        ];
        let data_source_handlers: Vec<Box<dyn DataSourceHandler>> = vec![
            Box::new(organization::OrganizationDataSource),
            Box::new(project::ProjectDataSource),
            Box::new(cluster::ClusterDataSource),
            Box::new(environment::EnvironmentDataSource),
            Box::new(application::ApplicationDataSource),
            Box::new(container::ContainerDataSource),
            Box::new(database::DatabaseDataSource),
            Box::new(helm::HelmDataSource),
        ];

        let mut resources = HashMap::new();
        for handler in resource_handlers {
            resources.insert(handler.type_name(), handler);
        }
        let mut data_sources = HashMap::new();
        for handler in data_source_handlers {
            data_sources.insert(handler.type_name(), handler);
        }
        Self {
            resources,
            data_sources,
        }
    }

    /// Look up a resource handler by its public type name.
    pub fn resource(&self, type_name: &str) -> Result<&dyn ResourceHandler, ProviderError> {
        self.resources
            .get(type_name)
            .map(Box::as_ref)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    /// Look up a data source handler by its public type name.
    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSourceHandler, ProviderError> {
        self.data_sources
            .get(type_name)
            .map(Box::as_ref)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    /// Assemble the full provider schema: config plus every handler's schema.
    pub fn provider_schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(provider_config_schema());
        for (name, handler) in &self.resources {
            schema = schema.with_resource(*name, handler.schema());
        }
        for (name, handler) in &self.data_sources {
            schema = schema.with_data_source(*name, handler.schema());
        }
        schema
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// The provider-level configuration schema.
pub fn provider_config_schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "access_token",
            Attribute::optional_string()
                .sensitive()
                .with_description("Qovery API token. Falls back to QOVERY_API_TOKEN."),
        )
        .with_attribute(
            "api_url",
            Attribute::optional_string().with_description("Override the Qovery API base url."),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_declared_resource_is_registered() {
        let registry = Registry::new();
        for name in [
            "qovery_organization",
            "qovery_project",
            "qovery_cluster",
            "qovery_environment",
            "qovery_application",
            "qovery_container",
            "qovery_database",
            "qovery_helm",
            "qovery_helm_repository",
            "qovery_container_registry",
            "qovery_aws_credentials",
            "qovery_gcp_credentials",
            "qovery_scaleway_credentials",
            "qovery_azure_credentials",
            "qovery_git_token",
            "qovery_deployment_stage",
            "qovery_terraform_service",
            "qovery_labels_group",
            "qovery_annotations_group",
        ] {
            assert!(registry.resource(name).is_ok(), "missing resource {}", name);
        }
    }

    #[test]
    fn every_declared_data_source_is_registered() {
        let registry = Registry::new();
        for name in [
            "qovery_organization",
            "qovery_project",
            "qovery_cluster",
            "qovery_environment",
            "qovery_application",
            "qovery_container",
            "qovery_database",
            "qovery_helm",
        ] {
            assert!(
                registry.data_source(name).is_ok(),
                "missing data source {}",
                name
            );
        }
    }

    #[test]
    fn unknown_type_is_a_typed_error() {
        let registry = Registry::new();
        let err = registry.resource("qovery_widget").unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[test]
    fn provider_schema_covers_the_registry() {
        let registry = Registry::new();
        let schema = registry.provider_schema();
        assert_eq!(schema.resources.len(), 19);
        assert_eq!(schema.data_sources.len(), 8);
        assert!(schema.provider.block.attributes["access_token"].flags.sensitive);
    }
}
