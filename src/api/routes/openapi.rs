//! OpenAPI specification endpoints.
//!
//! Serves the OpenAPI spec as JSON and a small documentation landing page.

use axum::{
    Router,
    response::{Html, Json},
    routing::get,
};
use utoipa::OpenApi;

use super::super::openapi::ApiDoc;
use super::app_state::AppState;

/// Create the OpenAPI router
pub fn openapi_router() -> Router<AppState> {
    Router::new()
        .route("/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_docs_html))
}

/// GET /openapi.json - Serve the OpenAPI specification as JSON
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "OpenAPI",
    responses(
        (status = 200, description = "OpenAPI specification", body = Object)
    )
)]
pub async fn serve_openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /docs - Serve a simple HTML page with link to OpenAPI spec
pub async fn serve_docs_html() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>Notes API - OpenAPI Documentation</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            max-width: 800px;
            margin: 50px auto;
            padding: 20px;
        }
        h1 { color: #333; }
        a.button {
            display: inline-block;
            margin-top: 20px;
            padding: 10px 20px;
            background-color: #007bff;
            color: white;
            text-decoration: none;
            border-radius: 5px;
        }
        code { background: #f5f5f5; padding: 2px 4px; }
    </style>
</head>
<body>
    <h1>Notes API Documentation</h1>
    <p>OpenAPI specification is available at:</p>
    <a class="button" href="/openapi.json">Download openapi.json</a>
    <h2>Endpoints</h2>
    <ul>
        <li><code>POST /notes/</code>, <code>GET /notes/?skip=0&amp;take=20</code></li>
        <li><code>GET|PUT|DELETE /notes/{note_id}/</code></li>
        <li><code>POST /register/</code>, <code>POST /login</code>, <code>GET /users/me/</code></li>
        <li><code>GET /health</code></li>
    </ul>
    <p>Load the spec into <a href="https://editor.swagger.io" target="_blank">Swagger Editor</a> to try requests.</p>
</body>
</html>
"#,
    )
}
