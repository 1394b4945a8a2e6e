mod common;

use serde_json::json;

use common::{registry_with, spawn_gateway, MockExecutor};

async fn spawn_api() -> (String, tempfile::TempDir) {
    let registry = registry_with("python", MockExecutor::new(Vec::new()));
    let (addr, dir) = spawn_gateway(registry).await;
    (format!("http://{addr}"), dir)
}

#[tokio::test]
async fn catalog_starts_empty_and_grows() {
    let (base, _dir) = spawn_api().await;
    let client = reqwest::Client::new();

    let listed = client
        .get(format!("{base}/api/v1/languages"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(listed.status(), reqwest::StatusCode::OK);
    let names: Vec<String> = listed.json().await.expect("body should be a JSON array");
    assert!(names.is_empty());

    let created = client
        .post(format!("{base}/api/v1/create"))
        .json(&json!({"name": "python"}))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(created.status(), reqwest::StatusCode::CREATED);

    let listed = client
        .get(format!("{base}/api/v1/languages"))
        .send()
        .await
        .expect("request should succeed");
    let names: Vec<String> = listed.json().await.expect("body should be a JSON array");
    assert_eq!(names, vec!["python"]);
}

#[tokio::test]
async fn duplicate_language_conflicts() {
    let (base, _dir) = spawn_api().await;
    let client = reqwest::Client::new();

    for expected in [reqwest::StatusCode::CREATED, reqwest::StatusCode::CONFLICT] {
        let response = client
            .post(format!("{base}/api/v1/create"))
            .json(&json!({"name": "java"}))
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn malformed_create_bodies_are_rejected() {
    let (base, _dir) = spawn_api().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/v1/create"))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{base}/api/v1/create"))
        .json(&json!({"name": ""}))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let (base, _dir) = spawn_api().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/api-docs/openapi.json"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let document: serde_json::Value = response.json().await.expect("openapi should be JSON");
    assert!(document["paths"]["/api/v1/languages"].is_object());
}
