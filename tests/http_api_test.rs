//! HTTP collaborator contract tests against a wiremock server.

use chrono::NaiveDate;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use garment_entry::config::ApiConfig;
use garment_entry::dto::{BatchPayload, CodeRecord};
use garment_entry::{auth, CodeSource, CodeValue, EntryApi, EntryError, HttpEntryApi};

fn api_for(server: &MockServer) -> HttpEntryApi {
    HttpEntryApi::new(&ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn payload() -> BatchPayload {
    BatchPayload {
        reference_no: "WR-2024-001".into(),
        work_order_no: Some("WO-778".into()),
        document_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
        container_count: 1,
        piece_count: 1,
        remarks: None,
        records: vec![CodeRecord {
            code: "ABC123".into(),
            container_no: "1".into(),
            record_id: None,
        }],
    }
}

#[tokio::test]
async fn lookup_sends_doc_and_code_with_bearer_token() {
    let server = MockServer::start().await;
    auth::store().set("test-token");
    Mock::given(method("GET"))
        .and(path("/codes/lookup"))
        .and(query_param("code", "ABC123"))
        .and(query_param("doc", "WO-778"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "0"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let source = CodeSource::WorkOrder("WO-778".into());
    let code = CodeValue::parse("abc123").unwrap();
    let response = api.lookup_code(&source, &code).await.unwrap();
    assert!(response.is_success());
    auth::store().clear();
}

#[tokio::test]
async fn lookup_success_marker_is_the_body_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/codes/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"code": "1", "msg": "code belongs to another work order"}),
        ))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let response = api
        .lookup_code(
            &CodeSource::ReceivedStock,
            &CodeValue::parse("ABC123").unwrap(),
        )
        .await
        .unwrap();
    assert!(!response.is_success());
    assert_eq!(
        response.msg.as_deref(),
        Some("code belongs to another work order")
    );
}

#[tokio::test]
async fn lookup_maps_non_2xx_to_not_eligible() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/codes/lookup"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let response = api
        .lookup_code(
            &CodeSource::ReceivedStock,
            &CodeValue::parse("ABC123").unwrap(),
        )
        .await
        .unwrap();
    assert!(!response.is_success());
    assert_eq!(response.code, "404");
}

#[tokio::test]
async fn create_posts_to_batches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "0"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let response = api.create_batch(&payload()).await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn update_puts_to_the_batch_id() {
    let server = MockServer::start().await;
    let batch_id = Uuid::new_v4();
    Mock::given(method("PUT"))
        .and(path(format!("/batches/{batch_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"code": "1", "msg": "batch already closed"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let response = api.update_batch(batch_id, &payload()).await.unwrap();
    assert!(!response.is_success());
    assert_eq!(response.msg.as_deref(), Some("batch already closed"));
}

#[tokio::test]
async fn container_deletion_is_scoped_by_batch_and_ordinal() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/batches/WR-2024-001/containers/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.delete_container("WR-2024-001", 2).await.unwrap();
}

#[tokio::test]
async fn failed_deletion_carries_the_server_message() {
    let server = MockServer::start().await;
    let record_id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path(format!("/codes/{record_id}")))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            serde_json::json!({"code": "1", "msg": "record already invoiced"}),
        ))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api.delete_code(record_id).await.unwrap_err();
    match err {
        EntryError::Deletion(msg) => assert_eq!(msg, "record already invoiced"),
        other => panic!("expected deletion error, got {other:?}"),
    }
}
