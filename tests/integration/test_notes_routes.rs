//! Note route tests against the in-memory backend.
//!
//! - POST /notes/
//! - GET /notes/
//! - GET /notes/{id}/
//! - PUT /notes/{id}/
//! - DELETE /notes/{id}/

use axum::body::Bytes;
use axum::http::{StatusCode, header};
use axum_test::TestServer;
use notes_api::models::Note;
use notes_api::routes::{build_app, create_app_state};
use serde_json::{Value, json};

fn create_test_server() -> TestServer {
    TestServer::new(build_app(create_app_state(), None)).unwrap()
}

async fn create_note(server: &TestServer, text: &str, completed: bool) -> Note {
    let response = server
        .post("/notes/")
        .json(&json!({ "text": text, "completed": completed }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_create_note_returns_201() {
    let server = create_test_server();

    let response = server
        .post("/notes/")
        .json(&json!({ "text": "buy milk", "completed": false }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "id": 1, "text": "buy milk", "completed": false }));
}

#[tokio::test]
async fn test_read_single_note() {
    let server = create_test_server();
    let created = create_note(&server, "write report", true).await;

    let response = server.get(&format!("/notes/{}/", created.id)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let note: Note = response.json();
    assert_eq!(note, created);
}

#[tokio::test]
async fn test_read_missing_note_returns_404_detail() {
    let server = create_test_server();

    let response = server.get("/notes/999/").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body, json!({ "detail": "No data found for ID: 999" }));
}

#[tokio::test]
async fn test_list_notes_defaults_and_pagination() {
    let server = create_test_server();
    for i in 0..25 {
        create_note(&server, &format!("note {}", i), i % 2 == 0).await;
    }

    let default_page: Vec<Note> = server.get("/notes/").await.json();
    assert_eq!(default_page.len(), 20);
    assert_eq!(default_page[0].id, 1);

    let response = server
        .get("/notes/")
        .add_query_param("skip", 22)
        .add_query_param("take", 10)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let tail: Vec<Note> = response.json();
    let ids: Vec<i32> = tail.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![23, 24, 25]);
}

#[tokio::test]
async fn test_list_notes_rejects_negative_skip() {
    let server = create_test_server();

    let response = server.get("/notes/").add_query_param("skip", -1).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_note() {
    let server = create_test_server();
    let created = create_note(&server, "draft", false).await;

    let response = server
        .put(&format!("/notes/{}/", created.id))
        .json(&json!({ "text": "final", "completed": true }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({ "id": created.id, "text": "final", "completed": true }));

    let fetched: Note = server.get(&format!("/notes/{}/", created.id)).await.json();
    assert_eq!(fetched.text, "final");
    assert!(fetched.completed);
}

#[tokio::test]
async fn test_update_missing_note_returns_404() {
    let server = create_test_server();

    let response = server
        .put("/notes/5/")
        .json(&json!({ "text": "ghost", "completed": false }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_note() {
    let server = create_test_server();
    let created = create_note(&server, "temporary", false).await;

    let response = server.delete(&format!("/notes/{}/", created.id)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "message": format!("Note with id: {} deleted successfully!", created.id) })
    );

    let response = server.get(&format!("/notes/{}/", created.id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_paths_without_trailing_slash() {
    let server = create_test_server();

    let response = server
        .post("/notes")
        .json(&json!({ "text": "no slash", "completed": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server.get("/notes/1").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

fn assert_json_detail(response: &axum_test::TestResponse, expected: StatusCode) {
    assert_eq!(response.status_code(), expected);
    assert_eq!(response.header(header::CONTENT_TYPE), "application/json");
    let body: Value = response.json();
    assert!(
        body["detail"].as_str().is_some_and(|detail| !detail.is_empty()),
        "unexpected error body: {}",
        body
    );
}

#[tokio::test]
async fn test_invalid_bodies_are_rejected() {
    let server = create_test_server();

    let missing_field = server.post("/notes/").json(&json!({ "text": "x" })).await;
    assert_json_detail(&missing_field, StatusCode::UNPROCESSABLE_ENTITY);

    let wrong_type = server
        .post("/notes/")
        .json(&json!({ "text": "x", "completed": "yes" }))
        .await;
    assert_json_detail(&wrong_type, StatusCode::UNPROCESSABLE_ENTITY);

    let malformed = server
        .post("/notes/")
        .bytes(Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;
    assert_json_detail(&malformed, StatusCode::BAD_REQUEST);

    let update = server.put("/notes/1/").json(&json!({ "completed": true })).await;
    assert_json_detail(&update, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let server = create_test_server();

    let response = server.get("/notes/abc/").await;
    assert_json_detail(&response, StatusCode::BAD_REQUEST);

    let delete = server.delete("/notes/abc").await;
    assert_json_detail(&delete, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_paging_is_rejected() {
    let server = create_test_server();

    let response = server.get("/notes/").add_query_param("skip", "ten").await;

    assert_json_detail(&response, StatusCode::BAD_REQUEST);
}
