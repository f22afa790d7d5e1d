//! HTTP client for the Qovery REST API.
//!
//! [`ApiClient`] owns the base URL, the auth token, and the JSON verbs.
//! Domain services in [`crate::services`] build on it; nothing above them
//! ever sees a raw status code. Status >= 400 always maps to
//! [`ProviderError::Api`] even when the transport succeeded.

use crate::error::ProviderError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

/// Default Qovery API base URL.
pub const DEFAULT_API_URL: &str = "https://api.qovery.com";

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "QOVERY_API_TOKEN";

/// Shape of the Qovery error payload. Anything else falls back to raw text.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

/// Client for the Qovery REST API.
///
/// One instance is created at provider configure time and shared (read-only)
/// by every domain service for the provider's lifetime.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Create a client against the given base URL with a bearer token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Create a client from `QOVERY_API_TOKEN` against the default API URL.
    pub fn from_env() -> Result<Self, ProviderError> {
        let token = std::env::var(TOKEN_ENV_VAR).map_err(|_| {
            ProviderError::InvalidConfiguration {
                summary: "Missing API token".to_string(),
                detail: format!(
                    "Set the provider's access_token attribute or the {} environment variable",
                    TOKEN_ENV_VAR
                ),
            }
        })?;
        Ok(Self::new(DEFAULT_API_URL, token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON response body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// POST `body` as JSON to `path` and decode the response.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        debug!(path, "POST");
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// PUT `body` as JSON to `path` and decode the response.
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        debug!(path, "PUT");
        let response = self
            .http
            .put(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// DELETE `path`, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ProviderError> {
        debug!(path, "DELETE");
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::api_error(status.as_u16(), response).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(Self::api_error(status.as_u16(), response).await)
        }
    }

    async fn api_error(status: u16, response: reqwest::Response) -> ProviderError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| match (b.message, b.detail) {
                (Some(message), Some(detail)) => Some(format!("{}: {}", message, detail)),
                (Some(message), None) => Some(message),
                (None, Some(detail)) => Some(detail),
                (None, None) => None,
            })
            .unwrap_or(body);
        ProviderError::Api {
            status,
            message,
            identity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_decodes_json_and_sends_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organization/org-1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "org-1"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "tok");
        let value: serde_json::Value = client.get("/organization/org-1").await.unwrap();
        assert_eq!(value["id"], "org-1");
    }

    #[tokio::test]
    async fn non_2xx_becomes_api_error_with_payload_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cluster/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "cluster not found"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "tok");
        let err = client
            .get::<serde_json::Value>("/cluster/missing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.detail().contains("cluster not found"));
    }

    #[tokio::test]
    async fn delete_tolerates_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/project/p-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "tok");
        client.delete("/project/p-1").await.unwrap();
    }

    #[tokio::test]
    async fn status_500_is_error_even_with_valid_transport() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/project/p-1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "tok");
        let err = client.delete("/project/p-1").await.unwrap_err();
        match err {
            ProviderError::Api { status, .. } => assert_eq!(status, 500),
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
