//! Authentication route tests.
//!
//! - POST /register/
//! - POST /login
//! - GET /users/me/

use axum::body::Bytes;
use axum::http::{StatusCode, header};
use axum_test::TestServer;
use notes_api::models::{Token, UserOut};
use notes_api::routes::{build_app, create_app_state};
use serde_json::{Value, json};

fn create_test_server() -> TestServer {
    TestServer::new(build_app(create_app_state(), None)).unwrap()
}

async fn register(server: &TestServer, username: &str, password: &str) -> UserOut {
    let response = server
        .post("/register/")
        .json(&json!({ "username": username, "password": password }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

async fn login(server: &TestServer, username: &str, password: &str) -> axum_test::TestResponse {
    server
        .post("/login")
        .form(&[("username", username), ("password", password)])
        .await
}

#[tokio::test]
async fn test_register_returns_public_user() {
    let server = create_test_server();

    let response = server
        .post("/register/")
        .json(&json!({ "username": "alice", "password": "wonderland" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "id": 1, "username": "alice" }));
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let server = create_test_server();
    register(&server, "alice", "wonderland").await;

    let response = server
        .post("/register/")
        .json(&json!({ "username": "alice", "password": "other" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Username already registered");
}

#[tokio::test]
async fn test_register_rejects_empty_fields() {
    let server = create_test_server();

    let response = server
        .post("/register/")
        .json(&json!({ "username": "  ", "password": "pw" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = server
        .post("/register/")
        .json(&json!({ "username": "bob", "password": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_and_read_current_user() {
    let server = create_test_server();
    let registered = register(&server, "alice", "wonderland").await;

    let response = login(&server, "alice", "wonderland").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let token: Token = response.json();
    assert_eq!(token.token_type, "bearer");

    let response = server
        .get("/users/me/")
        .authorization_bearer(&token.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let me: UserOut = response.json();
    assert_eq!(me, registered);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_401() {
    let server = create_test_server();
    register(&server, "alice", "wonderland").await;

    let response = login(&server, "alice", "looking-glass").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.header(header::WWW_AUTHENTICATE), "Bearer");
    let body: Value = response.json();
    assert_eq!(body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn test_login_unknown_user_is_401() {
    let server = create_test_server();

    let response = login(&server, "nobody", "whatever").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn test_login_trims_username_like_register() {
    let server = create_test_server();
    let registered = register(&server, " alice ", "wonderland").await;
    assert_eq!(registered.username, "alice");

    for username in [" alice ", "alice"] {
        let response = login(&server, username, "wonderland").await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_login_missing_field_is_json_422() {
    let server = create_test_server();

    let response = server
        .post("/login")
        .form(&[("username", "alice")])
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.header(header::CONTENT_TYPE), "application/json");
    let body: Value = response.json();
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("password")));
}

#[tokio::test]
async fn test_register_malformed_json_is_json_400() {
    let server = create_test_server();

    let response = server
        .post("/register/")
        .bytes(Bytes::from_static(b"{\"username\":"))
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_current_user_requires_token() {
    let server = create_test_server();

    let response = server.get("/users/me/").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.header(header::WWW_AUTHENTICATE), "Bearer");
}

#[tokio::test]
async fn test_current_user_rejects_invalid_token() {
    let server = create_test_server();

    let response = server
        .get("/users/me/")
        .authorization_bearer("not.a.token")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Invalid or expired token");
}
