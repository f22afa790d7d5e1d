//! Cloud credentials resources: `qovery_aws_credentials`,
//! `qovery_gcp_credentials`, `qovery_scaleway_credentials`, and
//! `qovery_azure_credentials`.
//!
//! One handler parameterized by cloud kind. The API only ever returns the id
//! and name; every secret field keeps its planned value in state.

use crate::error::ProviderError;
use crate::handler::{ReadOutcome, ResourceHandler};
use crate::import_id::parse_scoped_id;
use crate::resources::common::require_str;
use crate::schema::{Attribute, MergePolicy, Schema};
use crate::services::credentials::{
    AwsCredentialsRequest, AzureCredentialsRequest, CredentialsKind, CredentialsResponse,
    GcpCredentialsRequest, ScalewayCredentialsRequest,
};
use crate::services::ServiceBundle;
use serde_json::{json, Map, Value};

/// Fields beyond `name`, per cloud. All are required and write-only.
fn secret_fields(kind: CredentialsKind) -> &'static [&'static str] {
    match kind {
        CredentialsKind::Aws => &["access_key_id", "secret_access_key"],
        CredentialsKind::Gcp => &["gcp_credentials"],
        CredentialsKind::Scaleway => &[
            "scaleway_access_key",
            "scaleway_secret_key",
            "scaleway_project_id",
        ],
        CredentialsKind::Azure => &["azure_subscription_id", "azure_tenant_id"],
    }
}

fn to_state(organization_id: &str, response: CredentialsResponse, local: &Value) -> Value {
    let mut state = Map::new();
    state.insert("id".into(), json!(response.id));
    state.insert("organization_id".into(), json!(organization_id));
    state.insert("name".into(), json!(response.name));
    if let Some(local_obj) = local.as_object() {
        for (key, value) in local_obj {
            if key != "id" && key != "organization_id" && key != "name" {
                state.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(state)
}

/// Managed credentials resource for one cloud.
pub struct CredentialsResource {
    kind: CredentialsKind,
    type_name: &'static str,
}

impl CredentialsResource {
    /// `qovery_aws_credentials`.
    pub fn aws() -> Self {
        Self {
            kind: CredentialsKind::Aws,
            type_name: "qovery_aws_credentials",
        }
    }

    /// `qovery_gcp_credentials`.
    pub fn gcp() -> Self {
        Self {
            kind: CredentialsKind::Gcp,
            type_name: "qovery_gcp_credentials",
        }
    }

    /// `qovery_scaleway_credentials`.
    pub fn scaleway() -> Self {
        Self {
            kind: CredentialsKind::Scaleway,
            type_name: "qovery_scaleway_credentials",
        }
    }

    /// `qovery_azure_credentials`.
    pub fn azure() -> Self {
        Self {
            kind: CredentialsKind::Azure,
            type_name: "qovery_azure_credentials",
        }
    }

    async fn upsert(
        &self,
        services: &ServiceBundle,
        organization_id: &str,
        existing_id: Option<&str>,
        model: &Value,
    ) -> Result<CredentialsResponse, ProviderError> {
        let creds = &services.credentials;
        let name = require_str(model, "name")?;
        macro_rules! send {
            ($request:expr) => {
                match existing_id {
                    Some(id) => creds.update(self.kind, organization_id, id, &$request).await,
                    None => creds.create(self.kind, organization_id, &$request).await,
                }
            };
        }
        match self.kind {
            CredentialsKind::Aws => send!(AwsCredentialsRequest {
                name,
                access_key_id: require_str(model, "access_key_id")?,
                secret_access_key: require_str(model, "secret_access_key")?,
            }),
            CredentialsKind::Gcp => send!(GcpCredentialsRequest {
                name,
                gcp_credentials: require_str(model, "gcp_credentials")?,
            }),
            CredentialsKind::Scaleway => send!(ScalewayCredentialsRequest {
                name,
                scaleway_access_key: require_str(model, "scaleway_access_key")?,
                scaleway_secret_key: require_str(model, "scaleway_secret_key")?,
                scaleway_project_id: require_str(model, "scaleway_project_id")?,
            }),
            CredentialsKind::Azure => send!(AzureCredentialsRequest {
                name,
                azure_subscription_id: require_str(model, "azure_subscription_id")?,
                azure_tenant_id: require_str(model, "azure_tenant_id")?,
            }),
        }
    }
}

#[async_trait::async_trait]
impl ResourceHandler for CredentialsResource {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "organization_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("name", Attribute::required_string());
        for field in secret_fields(self.kind) {
            schema = schema.with_attribute(
                *field,
                Attribute::required_string()
                    .sensitive()
                    .with_merge(MergePolicy::PreferPlanIfPresent),
            );
        }
        schema
    }

    async fn create(
        &self,
        services: &ServiceBundle,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let organization_id = require_str(&planned, "organization_id")?;
        let response = self.upsert(services, &organization_id, None, &planned).await?;
        Ok(to_state(&organization_id, response, &planned))
    }

    async fn read(
        &self,
        services: &ServiceBundle,
        state: Value,
    ) -> Result<ReadOutcome, ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services.credentials.get(self.kind, &organization_id, &id).await {
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
        let response = self
            .upsert(services, &organization_id, Some(&id), &planned)
            .await?;
        Ok(to_state(&organization_id, response, &planned))
    }

    async fn delete(&self, services: &ServiceBundle, state: Value) -> Result<(), ProviderError> {
        let organization_id = require_str(&state, "organization_id")?;
        let id = require_str(&state, "id")?;
        match services
            .credentials
            .delete(self.kind, &organization_id, &id)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn import(&self, _services: &ServiceBundle, id: &str) -> Result<Value, ProviderError> {
        let (organization_id, credentials_id) = parse_scoped_id(id)?;
        Ok(json!({ "organization_id": organization_id, "id": credentials_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_cloud_declares_its_own_secret_fields() {
        let aws = CredentialsResource::aws().schema();
        assert!(aws.block.attributes.contains_key("secret_access_key"));
        assert!(aws.block.attributes["secret_access_key"].flags.sensitive);

        let gcp = CredentialsResource::gcp().schema();
        assert!(gcp.block.attributes.contains_key("gcp_credentials"));
        assert!(!gcp.block.attributes.contains_key("secret_access_key"));

        let azure = CredentialsResource::azure().schema();
        assert!(azure.block.attributes.contains_key("azure_tenant_id"));
    }

    #[test]
    fn state_keeps_planned_secrets_the_server_never_returns() {
        let response = CredentialsResponse {
            id: "cred-1".into(),
            name: "prod-aws".into(),
        };
        let planned = json!({
            "organization_id": "org-1",
            "name": "prod-aws",
            "access_key_id": "AKIA",
            "secret_access_key": "shhh",
        });
        let state = to_state("org-1", response, &planned);
        assert_eq!(state["secret_access_key"], "shhh");
        assert_eq!(state["id"], "cred-1");
    }
}
