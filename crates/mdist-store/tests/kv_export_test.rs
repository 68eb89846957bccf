//! Contract tests for KvUploader against a mock key-value bulk API.
//!
//! ## Endpoint Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | PUT    | `/accounts/{acct}/storage/kv/namespaces/{ns}/bulk` | `upload_*` |

use mdist_core::{Account, Amount, ClaimRecord, Hash32};
use mdist_store::{ExportError, KvConfig, KvUploader};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BULK_PATH: &str = "/accounts/acct-1/storage/kv/namespaces/ns-1/bulk";

fn uploader(mock_server: &MockServer) -> KvUploader {
    let mut config = KvConfig::new(
        mock_server.uri().parse().unwrap(),
        "acct-1",
        "ns-1",
        "test-token",
    );
    config.timeout_secs = 5;
    KvUploader::new(&config).unwrap()
}

fn claims(n: u8) -> Vec<ClaimRecord> {
    (0..n)
        .map(|i| ClaimRecord {
            index: u64::from(i),
            address: Account::from_bytes([i + 1; 20]),
            amount: Amount::from(u64::from(i) * 10 + 1),
            proof: vec![Hash32::new([i; 32])],
            flags: None,
        })
        .collect()
}

fn ok_body() -> serde_json::Value {
    serde_json::json!({ "success": true, "errors": [], "messages": [], "result": null })
}

// ── PUT bulk ─────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn upload_sends_authenticated_batches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(BULK_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(3)
        .mount(&mock_server)
        .await;

    let claims = claims(5);
    let written = uploader(&mock_server)
        .upload_claims(&claims, 2)
        .await
        .unwrap();
    assert_eq!(written, 5);

    let requests = mock_server.received_requests().await.unwrap();
    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| {
            let body: Vec<serde_json::Value> = serde_json::from_slice(&r.body).unwrap();
            body.len()
        })
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_pairs_are_keyed_by_checksummed_address() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(BULK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let claims = claims(1);
    uploader(&mock_server)
        .upload_claims(&claims, 100)
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let pair = &body[0];
    assert_eq!(pair["key"], claims[0].address.to_checksum());
    let value: ClaimRecord = serde_json::from_str(pair["value"].as_str().unwrap()).unwrap();
    assert_eq!(value, claims[0]);
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_fails_on_client_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(BULK_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = uploader(&mock_server)
        .upload_claims(&claims(3), 10)
        .await
        .unwrap_err();
    match err {
        ExportError::Api { status, body, .. } => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_fails_when_service_reports_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(BULK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "errors": [{ "code": 10001, "message": "namespace not found" }]
        })))
        .mount(&mock_server)
        .await;

    let err = uploader(&mock_server)
        .upload_claims(&claims(1), 10)
        .await
        .unwrap_err();
    match err {
        ExportError::Rejected { errors, .. } => assert!(errors.contains("namespace not found")),
        other => panic!("expected Rejected error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_retries_transient_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(BULK_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path(BULK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let written = uploader(&mock_server)
        .upload_claims(&claims(2), 10)
        .await
        .unwrap();
    assert_eq!(written, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_of_empty_set_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let written = uploader(&mock_server).upload_claims(&[], 10).await.unwrap();
    assert_eq!(written, 0);
}
