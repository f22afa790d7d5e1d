//! End-to-end provider lifecycle against a mock Qovery API.

use qovery_provider::testing::ProviderTester;
use qovery_provider::ProviderError;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn configured_tester(server: &MockServer) -> ProviderTester {
    let tester = ProviderTester::new();
    tester
        .configure(json!({"access_token": "tok", "api_url": server.uri()}))
        .unwrap();
    tester
}

#[tokio::test]
async fn project_crud_lifecycle() {
    let server = MockServer::start().await;
    let body = json!({
        "id": "proj-1",
        "organization_id": "org-1",
        "name": "web",
        "description": null,
    });
    Mock::given(method("POST"))
        .and(path("/organization/org-1/project"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(201).set_body_json(body.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/project/proj-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let tester = configured_tester(&server).await;
    let state = tester
        .lifecycle_create(
            "qovery_project",
            json!({"organization_id": "org-1", "name": "web"}),
        )
        .await
        .unwrap();
    assert_eq!(state["id"], "proj-1");
    assert_eq!(state["organization_id"], "org-1");

    let renamed = json!({
        "id": "proj-1",
        "organization_id": "org-1",
        "name": "web-renamed",
        "description": null,
    });
    Mock::given(method("PUT"))
        .and(path("/project/proj-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(renamed.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/project/proj-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(renamed))
        .mount(&server)
        .await;

    let state = tester
        .lifecycle_update(
            "qovery_project",
            state,
            json!({"organization_id": "org-1", "name": "web-renamed"}),
        )
        .await
        .unwrap();
    assert_eq!(state["name"], "web-renamed");

    Mock::given(method("DELETE"))
        .and(path("/project/proj-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    tester.delete("qovery_project", state).await.unwrap();
}

#[tokio::test]
async fn read_of_gone_resource_drops_it_from_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/project/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let tester = configured_tester(&server).await;
    let outcome = tester
        .read(
            "qovery_project",
            json!({"id": "gone", "organization_id": "org-1", "name": "web"}),
        )
        .await
        .unwrap();
    assert!(outcome.is_none());
}

#[tokio::test]
async fn delete_of_gone_resource_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/project/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tester = configured_tester(&server).await;
    tester
        .delete("qovery_project", json!({"id": "gone"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn update_of_gone_resource_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/project/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let tester = configured_tester(&server).await;
    let err = tester
        .update(
            "qovery_project",
            json!({"id": "gone", "organization_id": "org-1", "name": "web"}),
            json!({"organization_id": "org-1", "name": "web"}),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn data_source_miss_is_a_hard_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/project/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let tester = configured_tester(&server).await;
    let err = tester
        .read_data_source("qovery_project", json!({"id": "nope"}))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn scoped_import_splits_parent_and_child_ids() {
    let server = MockServer::start().await;
    let tester = configured_tester(&server).await;

    let state = tester
        .import_resource("qovery_deployment_stage", "env-1,stage-1")
        .await
        .unwrap();
    assert_eq!(state["environment_id"], "env-1");
    assert_eq!(state["id"], "stage-1");

    let err = tester
        .import_resource("qovery_deployment_stage", "stage-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidImportId(_)));
}

#[tokio::test]
async fn refresh_preserves_local_only_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organization/org-1/gitToken/gt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "gt-1",
            "name": "ci",
            "type": "GITHUB",
            "workspace": null,
            "description": null,
        })))
        .mount(&server)
        .await;

    let tester = configured_tester(&server).await;
    let state = tester
        .read(
            "qovery_git_token",
            json!({
                "id": "gt-1",
                "organization_id": "org-1",
                "name": "ci",
                "type": "GITHUB",
                "token": "ghp_secret",
            }),
        )
        .await
        .unwrap()
        .unwrap();
    // The API never echoes the token; state keeps the configured value.
    assert_eq!(state["token"], "ghp_secret");
}
