use std::io::Write;

use ptsandbox_api::types::{RequestBody, RequestEnvelope};
use ptsandbox_api::{ApiErrorKind, Client, ClientConfig, Error};
use serde_json::json;
use wiremock::matchers::{body_bytes, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn client_for(server: &MockServer, config: ClientConfig) -> Client {
    Client::with_base_url(&server.uri(), config).unwrap()
}

#[tokio::test]
async fn check_health_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/maintenance/checkHealth"))
        .and(header("x-api-key", "K"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("scan.example.com", "K"));
    let result = client.check_health().await.unwrap();
    assert_eq!(result, json!({"status": "ok"}));
}

#[tokio::test]
async fn check_health_bad_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/maintenance/checkHealth"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("scan.example.com", "K"));
    let err = client.check_health().await.unwrap_err();

    let api_err = err.api().expect("expected an API error");
    assert_eq!(api_err.kind, ApiErrorKind::BadApiKey);
    assert_eq!(api_err.status_code, 401);
    assert_eq!(api_err.message, "invalid key");
    assert_eq!(err.to_string(), "BadApiKey: invalid key 401");
}

#[tokio::test]
async fn classified_statuses_map_to_kinds() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, ClientConfig::new("h", "K"));

    let mut cases: Vec<(u16, ApiErrorKind)> = vec![
        (400, ApiErrorKind::BadRequest),
        (401, ApiErrorKind::BadApiKey),
        (404, ApiErrorKind::NotFound),
        (405, ApiErrorKind::BadMethod),
    ];
    cases.extend((500..=599).map(|s| (s, ApiErrorKind::InternalServerError)));

    for (status, kind) in cases {
        mock_server.reset().await;
        let text = format!("failure body {}", status);
        Mock::given(method("POST"))
            .and(path("/api/v1/engines/sandbox/getImages"))
            .respond_with(ResponseTemplate::new(status).set_body_string(text.clone()))
            .mount(&mock_server)
            .await;

        let err = client.get_images().await.unwrap_err();
        let api_err = err.api().unwrap_or_else(|| panic!("status {} not an API error", status));
        assert_eq!(api_err.kind, kind, "status {}", status);
        assert_eq!(api_err.status_code, status);
        assert_eq!(api_err.message, text);
    }
}

#[tokio::test]
async fn unclassified_status_is_an_explicit_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/maintenance/checkHealth"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    let err = client.check_health().await.unwrap_err();
    assert_eq!(err.api().map(|e| e.kind), Some(ApiErrorKind::Unclassified));
    assert_eq!(err.to_string(), "UnclassifiedApiError: forbidden 403");
}

#[tokio::test]
async fn success_body_is_returned_unchanged() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("images.json");

    Mock::given(method("POST"))
        .and(path("/api/v1/engines/sandbox/getImages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    let result = client.get_images().await.unwrap();

    let expected: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result, expected);
    assert_eq!(result["data"][1]["image_id"], "ubuntu-jammy-x64");
}

#[tokio::test]
async fn malformed_json_propagates_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/maintenance/checkHealth"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    let result = client.check_health().await;
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
async fn upload_sends_exact_bytes_as_octet_stream() {
    let mock_server = MockServer::start().await;
    let content: Vec<u8> = (0u8..=255).chain([0, 0, 0xff, 0x4d, 0x5a]).collect();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&content).unwrap();
    file.flush().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/storage/uploadScanFile"))
        .and(header("content-type", "application/octet-stream"))
        .and(header("x-api-key", "K"))
        .and(body_bytes(content.clone()))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("upload_scan_file.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    let result = client.upload_scan_file(file.path()).await.unwrap();
    assert_eq!(
        result["data"]["file_uri"],
        "storage://f8a2c1d0-5b7e-4e1a-9d2c-3f6b8a9e0c11"
    );
}

#[tokio::test]
async fn upload_content_type_does_not_leak_into_later_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/storage/uploadScanFile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/maintenance/checkHealth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    client.upload_scan_bytes(b"MZ".to_vec()).await.unwrap();
    client.check_health().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        "application/octet-stream"
    );
    assert!(requests[1].headers.get("content-type").is_none());
    assert!(client.default_headers().get("content-type").is_none());
}

#[tokio::test]
async fn upload_missing_file_is_read_error() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server, ClientConfig::new("h", "K"));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.bin");
    let err = client.upload_scan_file(&missing).await.unwrap_err();

    match err {
        Error::ReadFile { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_scan_task_uses_configured_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/analysis/createScanTask"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "file_uri": "s3://x",
            "file_name": "a.exe",
            "async_result": true,
            "short_result": true,
            "options": {
                "analysis_depth": 3,
                "passwords_for_unpack": [],
                "sandbox": {
                    "enabled": true,
                    "skip_check_mime_type": true,
                    "image_id": "win7-sp1-x64",
                    "analysis_duration": null
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"scan_id": "1c9e6b8a-2f3d-4e5a-8b7c-6d5e4f3a2b1c"},
            "errors": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new("h", "K")
        .with_analysis_depth(3)
        .with_sandbox_enabled(true)
        .with_sandbox_image_id("win7-sp1-x64");
    let client = client_for(&mock_server, config);
    let result = client
        .create_scan_task("s3://x", "a.exe", Vec::new())
        .await
        .unwrap();
    assert_eq!(
        result["data"]["scan_id"],
        "1c9e6b8a-2f3d-4e5a-8b7c-6d5e4f3a2b1c"
    );
}

#[tokio::test]
async fn create_scan_task_passwords_are_per_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/analysis/createScanTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    client
        .create_scan_task("s3://a", "a.zip", vec!["infected".to_string()])
        .await
        .unwrap();
    client
        .create_scan_task("s3://b", "b.zip", Vec::new())
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let first: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(first["options"]["passwords_for_unpack"], json!(["infected"]));
    assert_eq!(second["options"]["passwords_for_unpack"], json!([]));
}

#[tokio::test]
async fn check_scan_task_and_report_send_scan_id() {
    let mock_server = MockServer::start().await;
    let scan_id = "1c9e6b8a-2f3d-4e5a-8b7c-6d5e4f3a2b1c";

    Mock::given(method("POST"))
        .and(path("/api/v1/analysis/checkTask"))
        .and(body_json(json!({"scan_id": scan_id})))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("check_task.json")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analysis/report"))
        .and(body_json(json!({"scan_id": scan_id})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"verdict": "CLEAN"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    let task = client.check_scan_task(scan_id).await.unwrap();
    assert_eq!(task["data"]["state"], "FULL");

    let report = client.check_scan_report(scan_id).await.unwrap();
    assert_eq!(report["data"]["verdict"], "CLEAN");
}

#[tokio::test]
async fn report_for_unknown_scan_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/analysis/report"))
        .respond_with(ResponseTemplate::new(404).set_body_string("scan not found"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    let err = client.check_scan_report("missing").await.unwrap_err();
    assert_eq!(err.to_string(), "NotFound: scan not found 404");
}

#[tokio::test]
async fn send_request_with_custom_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/custom/endpoint"))
        .and(header("x-trace", "1"))
        .and(body_bytes(b"raw".to_vec()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([1, 2, 3])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, ClientConfig::new("h", "K"));
    let mut headers = client.default_headers().clone();
    headers.insert("x-trace", "1".parse().unwrap());
    let envelope = RequestEnvelope::new("/custom/endpoint", headers).with_raw(b"raw".to_vec());
    assert_eq!(envelope.body, RequestBody::Raw(b"raw".to_vec()));

    let result = client.send_request(envelope).await.unwrap();
    assert_eq!(result, json!([1, 2, 3]));
}
