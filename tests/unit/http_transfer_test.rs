//! Unit tests for the streaming HTTP transfer backend.

use std::time::Duration;

use classroom_offline::services::http_transfer::{HttpTransfer, TransferBackend};
use classroom_offline::types::errors::TransferError;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_writes_body_to_destination() {
    let server = MockServer::start().await;
    let body = vec![7u8; 64 * 1024];
    Mock::given(method("GET"))
        .and(path("/rec.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("downloads").join("f_1.mp4");
    let url = format!("{}/rec.mp4", server.uri());

    let written = HttpTransfer::default()
        .fetch(&url, &dest, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(written, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn test_fetch_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/expired.mp4"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("f_2.mp4");
    let url = format!("{}/expired.mp4", server.uri());

    let err = HttpTransfer::default()
        .fetch(&url, &dest, CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, TransferError::HttpStatus(403));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_fetch_stops_on_cancel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0u8; 16])
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("f_3.mp4");
    let url = format!("{}/slow.mp4", server.uri());
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        HttpTransfer::default().fetch(&url, &dest, cancel),
    )
    .await
    .expect("cancellation should end the transfer");
    assert_eq!(result, Err(TransferError::Cancelled));
}
