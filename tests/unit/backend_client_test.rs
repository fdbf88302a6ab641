//! Unit tests for the backend client against a mock HTTP server.

use classroom_offline::services::backend_client::{BackendClient, RecordingApi};
use classroom_offline::types::errors::ApiError;
use classroom_offline::types::session::{Session, UserProfile};
use classroom_offline::types::settings::ApiSettings;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, suffix: &str) -> BackendClient {
    BackendClient::new(&ApiSettings {
        base_url: format!("{}{}", server.uri(), suffix),
        request_timeout_secs: 5,
    })
    .unwrap()
}

fn session() -> Session {
    Session::new("tok-123", UserProfile::default())
}

#[tokio::test]
async fn test_resolve_recording_sends_bearer_and_parses_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getDownloadRecording/m-1"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "download_url": "https://cdn.example.com/m-1.mp4",
            "file_size": 1234
        })))
        .expect(1)
        .mount(&server)
        .await;

    let link = client_for(&server, "/api")
        .resolve_recording(&session(), "m-1")
        .await
        .unwrap();
    assert_eq!(link.usable_url(), Some("https://cdn.example.com/m-1.mp4"));
    assert_eq!(link.file_size, 1234);
}

#[tokio::test]
async fn test_resolve_recording_with_trailing_slash_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getDownloadRecording/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "download_url": "https://cdn.example.com/77.mp4",
            "file_size": "5000"
        })))
        .mount(&server)
        .await;

    let link = client_for(&server, "/api/")
        .resolve_recording(&session(), "77")
        .await
        .unwrap();
    assert_eq!(link.file_size, 5000);
}

#[tokio::test]
async fn test_resolve_recording_without_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getDownloadRecording/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"download_url": null})))
        .mount(&server)
        .await;

    let link = client_for(&server, "/api")
        .resolve_recording(&session(), "9")
        .await
        .unwrap();
    assert_eq!(link.usable_url(), None);
    assert_eq!(link.file_size, 0);
}

#[tokio::test]
async fn test_resolve_recording_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getDownloadRecording/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no recording"))
        .mount(&server)
        .await;

    let err = client_for(&server, "/api")
        .resolve_recording(&session(), "9")
        .await
        .unwrap_err();
    match err {
        ApiError::HttpStatus(code, body) => {
            assert_eq!(code, 404);
            assert_eq!(body, "no recording");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_resolve_recording_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getDownloadRecording/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, "/api")
        .resolve_recording(&session(), "9")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "student", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-9",
            "user": {"name": "Ana", "email": "ana@example.com", "grade": 11}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server, "/api")
        .login("student", "secret")
        .await
        .unwrap();
    assert_eq!(response.token, "tok-9");
    assert_eq!(response.user.name.as_deref(), Some("Ana"));
    assert_eq!(response.user.extra.get("grade"), Some(&json!(11)));
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = client_for(&server, "/api")
        .login("student", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus(401, _)));
}

#[test]
fn test_invalid_base_url() {
    let result = BackendClient::new(&ApiSettings {
        base_url: "not a url".to_string(),
        request_timeout_secs: 5,
    });
    assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
}
