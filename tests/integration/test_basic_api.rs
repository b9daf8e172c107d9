//! Basic API integration tests: health, documentation, middleware.

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use notes_api::routes::{build_app, create_app_state};
use serde_json::Value;

fn create_test_server() -> TestServer {
    TestServer::new(build_app(create_app_state(), None)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "notes-api");
    assert_eq!(body["storage"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let server = create_test_server();

    let response = server.get("/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["paths"].get("/notes/").is_some());
    assert!(body["paths"].get("/notes/{note_id}/").is_some());
    assert!(body["components"]["schemas"].get("Note").is_some());
}

#[tokio::test]
async fn test_docs_page() {
    let server = create_test_server();

    let response = server.get("/docs").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("/openapi.json"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = create_test_server();

    let response = server.get("/does-not-exist").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_mirrors_origin_with_credentials() {
    let server = create_test_server();

    let response = server
        .get("/notes/")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://example.com"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "http://example.com"
    );
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
        "true"
    );
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let server = TestServer::new(build_app(create_app_state(), Some(2))).unwrap();

    assert_eq!(server.get("/health").await.status_code(), StatusCode::OK);
    assert_eq!(server.get("/health").await.status_code(), StatusCode::OK);

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Too many requests");
}
