//! Domain services over the Qovery REST API.
//!
//! One service per resource family. Each wraps the shared [`ApiClient`] with
//! business-level operations returning domain structs and typed errors;
//! handlers above this layer never see raw HTTP status codes.

use crate::client::ApiClient;
use std::sync::Arc;

pub mod application;
pub mod cluster;
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
pub mod variables;

/// The provider-scoped bundle of domain services.
///
/// Constructed once at configure time around a single [`ApiClient`] and
/// shared read-only by every resource and data-source handler for the
/// provider's lifetime.
#[derive(Debug, Clone)]
pub struct ServiceBundle {
    /// Organization operations.
    pub organizations: organization::OrganizationService,
    /// Project operations.
    pub projects: project::ProjectService,
    /// Cluster operations, including kubeconfig management.
    pub clusters: cluster::ClusterService,
    /// Environment operations.
    pub environments: environment::EnvironmentService,
    /// Application operations, including variables and secrets.
    pub applications: application::ApplicationService,
    /// Container operations, including variables and secrets.
    pub containers: container::ContainerService,
    /// Database operations.
    pub databases: database::DatabaseService,
    /// Helm release operations.
    pub helms: helm::HelmService,
    /// Helm repository operations.
    pub helm_repositories: helm_repository::HelmRepositoryService,
    /// Container registry operations.
    pub container_registries: container_registry::ContainerRegistryService,
    /// Cloud credentials operations (AWS, GCP, Scaleway, Azure).
    pub credentials: credentials::CredentialsService,
    /// Git token operations.
    pub git_tokens: git_token::GitTokenService,
    /// Deployment stage operations.
    pub deployment_stages: deployment_stage::DeploymentStageService,
    /// Terraform service operations.
    pub terraform_services: terraform_service::TerraformServiceService,
    /// Labels and annotations group operations.
    pub metadata_groups: metadata_group::MetadataGroupService,
}

impl ServiceBundle {
    /// Build the full bundle around one shared client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            organizations: organization::OrganizationService::new(client.clone()),
            projects: project::ProjectService::new(client.clone()),
            clusters: cluster::ClusterService::new(client.clone()),
            environments: environment::EnvironmentService::new(client.clone()),
            applications: application::ApplicationService::new(client.clone()),
            containers: container::ContainerService::new(client.clone()),
            databases: database::DatabaseService::new(client.clone()),
            helms: helm::HelmService::new(client.clone()),
            helm_repositories: helm_repository::HelmRepositoryService::new(client.clone()),
            container_registries: container_registry::ContainerRegistryService::new(
                client.clone(),
            ),
            credentials: credentials::CredentialsService::new(client.clone()),
            git_tokens: git_token::GitTokenService::new(client.clone()),
            deployment_stages: deployment_stage::DeploymentStageService::new(client.clone()),
            terraform_services: terraform_service::TerraformServiceService::new(client.clone()),
            metadata_groups: metadata_group::MetadataGroupService::new(client),
        }
    }
}
