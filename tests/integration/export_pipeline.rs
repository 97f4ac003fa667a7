//! End-to-end export runs

use crate::common::{api_url, export_config, http_client, FakeStore, STORE_ID, TOKEN};
use ecwid_data_downloader::clock::ManualClock;
use ecwid_data_downloader::config::AuthMode;
use ecwid_data_downloader::downloader::{DownloadError, ExportExecutor};
use ecwid_data_downloader::fetcher::{EcwidFetcher, FetcherError};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn read_output(path: &std::path::Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str::<Value>(&text)
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

/// 250 products: one block of offsets 300, 200, 100, 0; the batch is pending
/// once, then completes; the file holds exactly that completed result.
#[tokio::test]
async fn test_export_250_products_over_http() {
    let server = MockServer::start().await;
    let store_path = format!("/api/v3/{STORE_ID}");

    Mock::given(method("GET"))
        .and(path(format!("{store_path}/products")))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 250})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{store_path}/batch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ticket": "t-250"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{store_path}/batch")))
        .and(query_param("ticket", "t-250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "IN_PROGRESS"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    let completed = json!({
        "status": "COMPLETED",
        "responses": [
            {"id": "0", "status": "COMPLETED", "httpBody": {"items": []}},
            {"id": "1", "status": "COMPLETED", "httpBody": {"items": [{"id": 201}]}},
            {"id": "2", "status": "COMPLETED", "httpBody": {"items": [{"id": 101}]}},
            {"id": "3", "status": "COMPLETED", "httpBody": {"items": [{"id": 1}]}}
        ]
    });
    Mock::given(method("GET"))
        .and(path(format!("{store_path}/batch")))
        .and(query_param("ticket", "t-250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = export_config("products", temp_dir.path());
    let clock = ManualClock::shared();
    let api = Arc::new(EcwidFetcher::new(Arc::new(http_client(
        &api_url(&server.uri()),
        AuthMode::Query,
        clock.clone(),
    ))));

    let summary = ExportExecutor::new(api, clock.clone(), &config)
        .execute()
        .await
        .unwrap();

    assert_eq!(summary.total, 250);
    assert_eq!(summary.blocks, 1);
    assert_eq!(summary.pages, 4);
    assert_eq!(summary.output_path, temp_dir.path().join("products.json"));

    let output = read_output(&summary.output_path);
    assert_eq!(output, vec![completed]);

    // The submitted batch body holds the four descending pages.
    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let body: Value = serde_json::from_slice(&post.body).unwrap();
    let paths: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["path"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/products?offset=300",
            "/products?offset=200",
            "/products?offset=100",
            "/products?offset=0"
        ]
    );
    assert!(requests
        .iter()
        .all(|r| r.url.query().unwrap_or_default().contains(&format!("token={TOKEN}"))));

    // count, submit, two polls: four throttled calls plus one poll wait
    let sleeps = clock.sleeps();
    assert_eq!(
        sleeps.iter().filter(|d| **d == Duration::from_millis(1000)).count(),
        4
    );
    assert_eq!(
        sleeps.iter().filter(|d| **d == Duration::from_millis(4000)).count(),
        1
    );
}

#[tokio::test]
async fn test_export_multiple_blocks_in_descending_order() {
    let temp_dir = TempDir::new().unwrap();
    let config = export_config("orders", temp_dir.path());
    let store = Arc::new(FakeStore::new(2050, 2));

    let summary = ExportExecutor::new(store.clone(), ManualClock::shared(), &config)
        .execute()
        .await
        .unwrap();

    let recorded = store.recorded();
    assert_eq!(recorded.total_calls, 1);
    assert_eq!(
        recorded.batches.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![2, 10, 10]
    );
    assert_eq!(recorded.batches[0][0].path, "/orders?offset=2100");
    assert_eq!(recorded.batches[2][9].path, "/orders?offset=0");
    // Two polls per ticket
    assert_eq!(recorded.status_calls.len(), 6);

    assert_eq!(summary.blocks, 3);
    assert_eq!(summary.pages, 22);

    let output = read_output(&temp_dir.path().join("orders.json"));
    assert_eq!(output.len(), 3);
    let tickets: Vec<&str> = output.iter().map(|r| r["ticket"].as_str().unwrap()).collect();
    assert_eq!(tickets, vec!["ticket-1", "ticket-2", "ticket-3"]);
    assert!(output.iter().all(|r| r["status"] == "COMPLETED"));
}

#[tokio::test]
async fn test_empty_resource_exports_single_page() {
    let temp_dir = TempDir::new().unwrap();
    let config = export_config("customers", temp_dir.path());
    let store = Arc::new(FakeStore::new(0, 1));

    let summary = ExportExecutor::new(store.clone(), ManualClock::shared(), &config)
        .execute()
        .await
        .unwrap();

    assert_eq!(summary.blocks, 1);
    assert_eq!(store.recorded().batches[0].len(), 1);
    assert_eq!(store.recorded().batches[0][0].path, "/customers?offset=0");
    assert_eq!(read_output(&summary.output_path).len(), 1);
}

#[tokio::test]
async fn test_poll_timeout_aborts_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let config = export_config("products", temp_dir.path());
    let store = Arc::new(FakeStore::never_completing(1500));

    let err = ExportExecutor::new(store.clone(), ManualClock::shared(), &config)
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::BatchTimeout { .. }), "{err:?}");
    // Aborted on the first block
    assert_eq!(store.recorded().batches.len(), 1);
    assert!(!temp_dir.path().join("products.json").exists());
}

#[tokio::test]
async fn test_submit_failure_aborts_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let config = export_config("products", temp_dir.path());
    let store = Arc::new(FakeStore::failing_submit(300));

    let err = ExportExecutor::new(store, ManualClock::shared(), &config)
        .execute()
        .await
        .unwrap_err();

    assert!(
        matches!(err, DownloadError::Fetcher(FetcherError::HttpError(_))),
        "{err:?}"
    );
    assert!(!temp_dir.path().join("products.json").exists());
}

#[tokio::test]
async fn test_existing_output_is_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("products.json");
    std::fs::write(&path, r#"{"old": true}"#).unwrap();

    let config = export_config("products", temp_dir.path());
    ExportExecutor::new(Arc::new(FakeStore::new(10, 1)), ManualClock::shared(), &config)
        .execute()
        .await
        .unwrap();

    assert_eq!(read_output(&path).len(), 1);
}

#[tokio::test]
async fn test_unplannable_total_aborts_before_submitting() {
    for total in [u64::MAX, i64::MAX as u64 + 1000] {
        let temp_dir = TempDir::new().unwrap();
        let config = export_config("products", temp_dir.path());
        let store = Arc::new(FakeStore::new(total, 1));

        let err = ExportExecutor::new(store.clone(), ManualClock::shared(), &config)
            .execute()
            .await
            .unwrap_err();

        match err {
            DownloadError::TotalOutOfRange { total: reported } => assert_eq!(reported, total),
            other => panic!("expected TotalOutOfRange, got {other:?}"),
        }
        assert!(store.recorded().batches.is_empty());
        assert!(!temp_dir.path().join("products.json").exists());
    }
}
