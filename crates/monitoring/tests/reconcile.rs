//! Ensure-or-create behaviour against a fake Grafana.

mod common;

use assert_matches::assert_matches;
use common::FakeGrafana;
use serde_json::json;
use srd_monitoring::{GrafanaApi, GrafanaApiError, Reconciler};

fn prometheus_ds() -> serde_json::Value {
    json!({
        "name": "Prometheus",
        "type": "prometheus",
        "url": "http://prometheus:9090",
        "access": "proxy"
    })
}

#[tokio::test]
async fn creates_missing_datasource() {
    let fake = FakeGrafana::new();
    let api = GrafanaApi::new(fake.start().await, "token");

    let result = Reconciler::new(&api)
        .ensure_datasource(&prometheus_ds())
        .await
        .unwrap();

    assert!(result.created);
    assert_eq!(result.uid(), Some("ds-1"));
    assert_eq!(fake.count("POST /api/datasources"), 1);
    assert_eq!(fake.count("GET /api/datasources"), 0);
}

#[tokio::test]
async fn existing_datasource_is_reused_with_one_create_call() {
    let fake = FakeGrafana::new();
    fake.seed_datasource(json!({
        "id": 7, "uid": "existing-ds", "name": "Prometheus",
        "type": "prometheus", "url": "http://prometheus:9090"
    }));
    let api = GrafanaApi::new(fake.start().await, "token");

    let result = Reconciler::new(&api)
        .ensure_datasource(&prometheus_ds())
        .await
        .unwrap();

    assert!(!result.created);
    assert_eq!(result.data["uid"], "existing-ds");
    assert_eq!(fake.count("POST /api/datasources"), 1);
    assert_eq!(fake.count("GET /api/datasources"), 1);
    assert_eq!(fake.datasource_count(), 1);
}

#[tokio::test]
async fn second_datasource_ensure_finds_the_first() {
    let fake = FakeGrafana::new();
    let api = GrafanaApi::new(fake.start().await, "token");
    let reconciler = Reconciler::new(&api);

    let first = reconciler.ensure_datasource(&prometheus_ds()).await.unwrap();
    let second = reconciler.ensure_datasource(&prometheus_ds()).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    // Created response nests the uid; the listing entry has it at top level.
    assert!(first.data["uid"].is_null());
    assert_eq!(second.data["uid"], "ds-1");
    assert_eq!(first.uid(), second.uid());
    assert_eq!(fake.datasource_count(), 1);
    assert_eq!(fake.count("POST /api/datasources"), 2);
}

#[tokio::test]
async fn second_folder_ensure_returns_existing() {
    let fake = FakeGrafana::new();
    let api = GrafanaApi::new(fake.start().await, "token");
    let reconciler = Reconciler::new(&api);

    let first = reconciler.ensure_folder("SRD").await.unwrap();
    let second = reconciler.ensure_folder("SRD").await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.uid(), second.uid());
}

#[tokio::test]
async fn conflict_without_listed_match_is_an_error() {
    let fake = FakeGrafana::new();
    fake.seed_folder(json!({"uid": "f-old", "title": "SRD"}));
    fake.hide_listings();
    let api = GrafanaApi::new(fake.start().await, "token");

    let err = Reconciler::new(&api).ensure_folder("SRD").await.unwrap_err();

    assert_matches!(err, GrafanaApiError::ApiError { status: 409, .. });
}

#[tokio::test]
async fn already_exists_message_counts_as_conflict() {
    let fake = FakeGrafana::new();
    fake.seed_folder(json!({"uid": "f-old", "title": "SRD"}));
    fake.fail("POST /api/folders", 400, r#"{"message":"Folder Already Exists"}"#);
    let api = GrafanaApi::new(fake.start().await, "token");

    let result = Reconciler::new(&api).ensure_folder("SRD").await.unwrap();

    assert!(!result.created);
    assert_eq!(result.uid(), Some("f-old"));
}

#[tokio::test]
async fn other_failures_propagate_without_lookup() {
    let fake = FakeGrafana::new();
    fake.fail("POST /api/datasources", 500, "internal error");
    let api = GrafanaApi::new(fake.start().await, "token");

    let err = Reconciler::new(&api)
        .ensure_datasource(&prometheus_ds())
        .await
        .unwrap_err();

    assert_matches!(err, GrafanaApiError::ApiError { status: 500, .. });
    assert_eq!(fake.count("GET /api/datasources"), 0);
}

#[tokio::test]
async fn malformed_success_body_is_an_error() {
    let fake = FakeGrafana::new();
    fake.fail("POST /api/folders", 200, "<html>not json</html>");
    let api = GrafanaApi::new(fake.start().await, "token");

    let err = Reconciler::new(&api).ensure_folder("SRD").await.unwrap_err();

    assert_matches!(err, GrafanaApiError::MalformedResponse(_));
}

#[tokio::test]
async fn dashboard_upsert_always_reports_created() {
    let fake = FakeGrafana::new();
    let api = GrafanaApi::new(fake.start().await, "token");
    let reconciler = Reconciler::new(&api);
    let dash = json!({"uid": "srd-api", "title": "SRD", "panels": [{"id": 1}]});

    let first = reconciler.upsert_dashboard(&dash, "folder-1").await.unwrap();
    let second = reconciler.upsert_dashboard(&dash, "folder-1").await.unwrap();

    assert!(first.created);
    assert!(second.created);
    let saved = fake.saved();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0]["folderUid"], "folder-1");
    assert_eq!(saved[0]["overwrite"], true);
    assert_eq!(saved[0]["dashboard"]["schemaVersion"], 39);
    assert_eq!(saved[0]["dashboard"]["timezone"], "browser");
}

#[tokio::test]
async fn unreachable_grafana_is_a_request_error() {
    let api = GrafanaApi::new(common::dead_base_url().await, "");

    let err = Reconciler::new(&api).ensure_folder("SRD").await.unwrap_err();

    assert_matches!(err, GrafanaApiError::Request(_));
}
