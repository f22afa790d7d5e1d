//! Error types for the Qovery provider.
//!
//! Every handler surfaces failures through [`ProviderError`]: one taxonomy
//! (kind + summary + detail) regardless of resource family, so diagnostics
//! look the same whether they come from a cluster or a git token.

use crate::schema::Diagnostic;
use thiserror::Error;

/// Errors that can occur while managing Qovery resources.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource does not exist server-side.
    #[error("{resource} '{id}' not found")]
    NotFound {
        /// Resource family, e.g. `cluster`.
        resource: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A value-level validation error (bad URL, malformed JSON blob, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A cross-field configuration error detected by a handler or converter.
    #[error("Invalid configuration: {summary}")]
    InvalidConfiguration {
        /// Short human-readable summary.
        summary: String,
        /// Longer explanation of what to fix.
        detail: String,
    },

    /// An attempt to change an attribute that cannot be modified after creation.
    #[error("Cannot update immutable attribute '{attribute}' on {resource}")]
    ImmutableAttribute {
        /// Resource family the attribute belongs to.
        resource: &'static str,
        /// The attribute that was illegally changed.
        attribute: &'static str,
        /// Prior and planned values for the diagnostic detail.
        detail: String,
    },

    /// A malformed import identifier.
    #[error("Invalid import id: {0}")]
    InvalidImportId(String),

    /// The requested resource or data source type is not registered.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// An operation was attempted before the provider was configured.
    #[error("Provider is not configured")]
    Unconfigured,

    /// The Qovery API rejected the request (status >= 400).
    #[error("Qovery API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Message extracted from the error payload, or the raw body.
        message: String,
        /// Resource identity, when known, to aid multi-resource applies.
        identity: Option<String>,
    },

    /// An HTTP transport failure (connection refused, timeout, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Whether this error denotes a missing resource.
    ///
    /// Read handlers use this to drop deleted resources from state, and
    /// delete handlers to treat an already-gone resource as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Api { status: 404, .. })
    }

    /// Rebind a raw API 404 to a typed not-found for the given resource.
    ///
    /// Other API errors get the resource identity attached so diagnostics
    /// name which resource of a multi-resource apply failed.
    pub fn for_resource(self, resource: &'static str, id: &str) -> Self {
        match self {
            Self::Api { status: 404, .. } => Self::NotFound {
                resource,
                id: id.to_string(),
            },
            Self::Api {
                status, message, ..
            } => Self::Api {
                status,
                message,
                identity: Some(format!("{} '{}'", resource, id)),
            },
            other => other,
        }
    }

    /// Short summary for diagnostics.
    pub fn summary(&self) -> String {
        match self {
            Self::NotFound { resource, .. } => format!("{} not found", resource),
            Self::Validation(_) => "Validation error".to_string(),
            Self::InvalidConfiguration { summary, .. } => summary.clone(),
            Self::ImmutableAttribute {
                resource,
                attribute,
                ..
            } => format!("Cannot update '{}' on {}", attribute, resource),
            Self::InvalidImportId(_) => "Invalid import id".to_string(),
            Self::UnknownResource(_) => "Unknown resource type".to_string(),
            Self::Unconfigured => "Provider is not configured".to_string(),
            Self::Api { identity, .. } => match identity {
                Some(identity) => format!("Qovery API error on {}", identity),
                None => "Qovery API error".to_string(),
            },
            Self::Transport(_) => "Transport error".to_string(),
            Self::Serialization(_) => "Serialization error".to_string(),
        }
    }

    /// Longer detail for diagnostics.
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidConfiguration { detail, .. } => detail.clone(),
            Self::ImmutableAttribute { detail, .. } => detail.clone(),
            Self::Api {
                status, message, ..
            } => format!("status {}: {}", status, message),
            other => other.to_string(),
        }
    }

    /// Convert into an error diagnostic with summary and detail populated.
    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.summary()).with_detail(self.detail())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguished() {
        let err = ProviderError::NotFound {
            resource: "cluster",
            id: "abc".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(format!("{}", err), "cluster 'abc' not found");

        let err = ProviderError::Api {
            status: 404,
            message: "no such environment".to_string(),
            identity: None,
        };
        assert!(err.is_not_found());

        let err = ProviderError::Api {
            status: 500,
            message: "boom".to_string(),
            identity: None,
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn for_resource_rebinds_404() {
        let err = ProviderError::Api {
            status: 404,
            message: "not found".to_string(),
            identity: None,
        }
        .for_resource("database", "db-1");

        match err {
            ProviderError::NotFound { resource, id } => {
                assert_eq!(resource, "database");
                assert_eq!(id, "db-1");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn for_resource_attaches_identity() {
        let err = ProviderError::Api {
            status: 409,
            message: "name already taken".to_string(),
            identity: None,
        }
        .for_resource("project", "p-1");

        assert_eq!(err.summary(), "Qovery API error on project 'p-1'");
        assert!(err.detail().contains("name already taken"));
    }

    #[test]
    fn immutable_attribute_names_the_field() {
        let err = ProviderError::ImmutableAttribute {
            resource: "database",
            attribute: "type",
            detail: "cannot change from REDIS to POSTGRESQL".to_string(),
        };
        assert!(format!("{}", err).contains("'type'"));
        assert!(err.detail().contains("REDIS"));
    }

    #[test]
    fn diagnostic_carries_summary_and_detail() {
        let diag = ProviderError::Validation("bad url".to_string()).into_diagnostic();
        assert_eq!(diag.summary, "Validation error");
        assert_eq!(diag.detail.as_deref(), Some("Validation error: bad url"));
    }
}
